/// Data Transfer Objects for the application layer
mod analysis_request;
mod analysis_response;
mod output_format;

pub use analysis_request::{AnalysisRequest, AnalysisRequestBuilder, PackageSource};
pub use analysis_response::{AnalysisResponse, AnalysisSummary};
pub use output_format::OutputFormat;
