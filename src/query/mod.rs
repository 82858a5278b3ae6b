/*!
Query pipeline: parse -> validate -> decode -> dispatch -> normalize.

Module layout:
  parse.rs      query text -> (endpoint, optional body)
  validate.rs   advisory validation with rerun override
  decode.rs     ArgumentSet + per-transform argument decoding
  dispatch.rs   remote invocation + raw-result extraction
  normalize.rs  Table / Status, the pipeline's uniform output

Every failure mode resolves to a returned `Status`; nothing in this module
propagates an error past the pipeline boundary.
*/

pub mod decode;
pub mod dispatch;
pub mod normalize;
pub mod parse;
pub mod validate;

pub use dispatch::run_query;
pub use validate::validate;
