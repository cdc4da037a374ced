//! 会话层：交易页面会话抽象与实现（Chrome / Mock）

pub mod chrome;
pub mod mock;
pub mod traits;

pub use chrome::{ChromeSession, ChromeSessionFactory, ControlSelectors};
pub use mock::{MockFactoryState, MockSession, MockSessionFactory, MockSessionState};
pub use traits::{Control, ControlTag, SessionError, SessionFactory, TradingSession};
