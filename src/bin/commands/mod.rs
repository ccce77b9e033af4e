pub mod inspect_cmd;
pub mod lookup_cmd;
pub mod query_cmd;
pub mod resolve_cmd;

pub use inspect_cmd::cmd_inspect;
pub use lookup_cmd::cmd_lookup;
pub use query_cmd::cmd_query;
pub use resolve_cmd::cmd_resolve;
