//! 基础设施层
//!
//! 持有稀缺资源（浏览器页面），只暴露能力

pub mod anchors;
pub mod chrome_driver;
pub mod navigator;
pub mod retry;
pub mod session_handle;
pub mod ui_driver;

pub use chrome_driver::ChromeDriver;
pub use navigator::Navigator;
pub use retry::{retry_on_staleness, StaleRetryPolicy};
pub use session_handle::SessionHandle;
pub use ui_driver::{Anchor, AnchorState, Selector, UiDriver};
