mod context;
mod fanout;
mod label_values;
mod merge_querier;
mod querier;
mod remote;
mod required_matchers;

#[cfg(test)]
pub(crate) mod test_utils;

pub use context::*;
pub use fanout::*;
pub use label_values::*;
pub use merge_querier::*;
pub use querier::*;
pub use remote::*;
pub use required_matchers::*;
