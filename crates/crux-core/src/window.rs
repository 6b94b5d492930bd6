use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{NativeHandle, Vec2i, Vec2u, WindowProperties};

/// A boxed error type for window operations.
///
/// Any error type that implements `std::error::Error` (or a plain string)
/// can be boxed into this.
pub type WindowResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Shared, reference-counted handle to a live window.
///
/// The window is destroyed when the last handle is dropped.
pub type WindowHandle = Arc<Window>;

/// The "wants to close" signal of a window.
///
/// Cloning shares the same flag. Reads and writes are lock-free, so the
/// OS event thread and the application thread can both use it.
#[derive(Debug, Clone, Default)]
pub struct CloseFlag(Arc<AtomicBool>);

impl CloseFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, close: bool) {
        self.0.store(close, Ordering::Release);
    }

    /// The underlying atomic, for backends that hand its address to the
    /// OS. Valid for as long as any clone of this flag is alive.
    pub fn as_atomic(&self) -> &AtomicBool {
        &self.0
    }
}

/// Platform-specific implementation of a native window.
///
/// Each platform crate (e.g. `crux-windows`) provides one. The backend owns
/// the native window and must release it in `Drop`. [`Window`] keeps the
/// cached properties and calls into the backend for every mutation.
pub trait PlatformBackend: Send {
    /// Creates the native window.
    ///
    /// `close` is the window's close flag; the backend keeps a clone and
    /// raises it when the OS asks the window to close.
    fn create(props: &WindowProperties, close: CloseFlag) -> WindowResult<Self>
    where
        Self: Sized;

    /// Updates the native title.
    fn set_title(&mut self, title: &str) -> WindowResult<()>;

    /// Moves the native window.
    fn set_position(&mut self, position: Vec2i) -> WindowResult<()>;

    /// Resizes the native window.
    fn set_size(&mut self, size: Vec2u) -> WindowResult<()>;

    /// Called after the application raised or cleared the close request
    /// through [`Window::set_wants_to_close`]. The flag is already updated.
    fn on_close_requested(&mut self, _close: bool) {}

    /// The native window handle, if the backend exposes one.
    fn platform_handle(&self) -> Option<NativeHandle> {
        None
    }
}

struct WindowState {
    title: String,
    position: Vec2i,
    size: Vec2u,
    position_centered: bool,
    backend: Box<dyn PlatformBackend>,
}

/// A platform-independent window.
///
/// Title, position and size are a cached mirror of the OS state: getters
/// read the cache, mutators update the OS through the backend and then the
/// cache. These are expected to have a single writer; the close flag is
/// the only state meant to be shared across threads.
///
/// Created through [`Window::create_with`] (or the `crux` crate's factory),
/// never directly, and never cloned.
pub struct Window {
    state: Mutex<WindowState>,
    wants_to_close: CloseFlag,
}

impl Window {
    /// Creates a window backed by `B`.
    ///
    /// Returns `None` if the backend fails; the reason is logged.
    pub fn create_with<B: PlatformBackend + 'static>(
        props: &WindowProperties,
    ) -> Option<WindowHandle> {
        match Self::try_create_with::<B>(props) {
            Ok(window) => Some(window),
            Err(e) => {
                crate::log_error!("failed to create window \"{}\": {e}", props.title);
                None
            }
        }
    }

    /// Creates a window backed by `B`, returning the backend's error on
    /// failure.
    pub fn try_create_with<B: PlatformBackend + 'static>(
        props: &WindowProperties,
    ) -> WindowResult<WindowHandle> {
        let wants_to_close = CloseFlag::new();
        let backend = B::create(props, wants_to_close.clone())?;

        crate::log_debug!(
            "created window \"{}\" {}x{} at ({},{})",
            props.title,
            props.width,
            props.height,
            props.position_x,
            props.position_y
        );

        Ok(Arc::new(Self {
            state: Mutex::new(WindowState {
                title: props.title.clone(),
                position: props.position(),
                size: props.size(),
                position_centered: props.position_centered,
                backend: Box::new(backend),
            }),
            wants_to_close,
        }))
    }

    pub fn title(&self) -> String {
        self.state().title.clone()
    }

    /// Sets the title, both natively and in the cache.
    pub fn set_title(&self, title: impl Into<String>) -> WindowResult<()> {
        let title = title.into();
        let mut state = self.state();
        state.backend.set_title(&title)?;
        state.title = title;
        Ok(())
    }

    /// Screen position in pixels.
    pub fn position(&self) -> Vec2i {
        self.state().position
    }

    pub fn position_x(&self) -> i32 {
        self.position().x
    }

    pub fn position_y(&self) -> i32 {
        self.position().y
    }

    /// Moves the window. Every other position setter funnels into this one.
    pub fn set_position(&self, position: Vec2i) -> WindowResult<()> {
        let mut state = self.state();
        state.backend.set_position(position)?;
        state.position = position;
        Ok(())
    }

    pub fn set_position_xy(&self, x: i32, y: i32) -> WindowResult<()> {
        self.set_position(Vec2i::new(x, y))
    }

    /// Moves the window horizontally, keeping its vertical position.
    pub fn set_position_x(&self, x: i32) -> WindowResult<()> {
        self.set_position(Vec2i::new(x, self.position_y()))
    }

    /// Moves the window vertically, keeping its horizontal position.
    pub fn set_position_y(&self, y: i32) -> WindowResult<()> {
        self.set_position(Vec2i::new(self.position_x(), y))
    }

    /// Whether unspecified position components mean "centered".
    pub fn is_position_centered(&self) -> bool {
        self.state().position_centered
    }

    /// Size in screen pixels.
    pub fn size(&self) -> Vec2u {
        self.state().size
    }

    pub fn width(&self) -> u32 {
        self.size().x
    }

    pub fn height(&self) -> u32 {
        self.size().y
    }

    /// Resizes the window. Every other size setter funnels into this one.
    pub fn set_size(&self, size: Vec2u) -> WindowResult<()> {
        let mut state = self.state();
        state.backend.set_size(size)?;
        state.size = size;
        Ok(())
    }

    pub fn set_size_wh(&self, width: u32, height: u32) -> WindowResult<()> {
        self.set_size(Vec2u::new(width, height))
    }

    pub fn set_width(&self, width: u32) -> WindowResult<()> {
        self.set_size(Vec2u::new(width, self.height()))
    }

    pub fn set_height(&self, height: u32) -> WindowResult<()> {
        self.set_size(Vec2u::new(self.width(), height))
    }

    /// Whether the OS (or the application) asked this window to close.
    ///
    /// Advisory: every other operation stays valid after a close request.
    pub fn wants_to_close(&self) -> bool {
        self.wants_to_close.get()
    }

    /// Raises or clears the close request, then tells the backend.
    ///
    /// Raising it is the usual way to simulate a close from inside the
    /// application (e.g. a "Quit" button). Clearing it is rarely needed.
    /// The flag is visible to [`wants_to_close`](Self::wants_to_close)
    /// before the backend hook runs.
    pub fn set_wants_to_close(&self, close: bool) {
        self.wants_to_close.set(close);
        self.state().backend.on_close_requested(close);
    }

    /// Snapshot of the cached properties.
    pub fn properties(&self) -> WindowProperties {
        let state = self.state();
        WindowProperties::from_vectors(
            state.title.clone(),
            state.size,
            state.position,
            state.position_centered,
        )
    }

    /// The backend's native window handle (an `HWND` on Windows).
    pub fn platform_handle(&self) -> Option<NativeHandle> {
        self.state().backend.platform_handle()
    }

    fn state(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Window")
            .field("title", &state.title)
            .field("position", &state.position)
            .field("size", &state.size)
            .field("wants_to_close", &self.wants_to_close.get())
            .finish_non_exhaustive()
    }
}
