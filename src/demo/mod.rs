pub mod feed;
pub mod script;

pub use feed::{DemoFeed, FeedState};
pub use script::{ScriptLine, demo_script};
