//! Migration planning domain: dependency tree model, compatibility rules and
//! the services that resolve, analyse, order and stage packages.
pub mod domain;
pub mod policies;
pub mod services;
