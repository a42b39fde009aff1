mod call_exception;
mod gas_estimation;
mod internal;
mod legacy;
mod response_body;

pub use call_exception::CallExceptionExtractor;
pub use gas_estimation::GasEstimationExtractor;
pub use internal::InternalErrorExtractor;
pub use legacy::LegacyRevertExtractor;
pub use response_body::ResponseBodyExtractor;
