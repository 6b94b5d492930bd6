pub mod config;
pub mod handle;
pub mod library;
pub mod log;
pub mod platform;
pub mod properties;
pub mod vector;
pub mod window;

pub use handle::NativeHandle;
pub use library::{LibraryRegistry, Loader};
pub use platform::{Platform, TARGET_PLATFORM};
pub use properties::{AxisPlacement, WindowProperties};
pub use vector::{Vec2i, Vec2u, Vector2};
pub use window::{CloseFlag, PlatformBackend, Window, WindowHandle, WindowResult};
