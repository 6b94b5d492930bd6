use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};

use crux_core::{
    CloseFlag, NativeHandle, PlatformBackend, Vec2i, Vec2u, WindowProperties, WindowResult,
};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CW_USEDEFAULT, CreateWindowExW, DefWindowProcW, DestroyWindow, GWLP_USERDATA,
    GetSystemMetrics, GetWindowLongPtrW, IDC_ARROW, LoadCursorW, PostMessageW, RegisterClassW,
    SET_WINDOW_POS_FLAGS, SM_CXSCREEN, SM_CYSCREEN, SWP_ASYNCWINDOWPOS, SWP_NOACTIVATE,
    SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SetWindowLongPtrW, SetWindowPos, SetWindowTextW,
    WINDOW_EX_STYLE, WM_APP, WM_CLOSE, WNDCLASSW, WS_OVERLAPPEDWINDOW, WS_VISIBLE,
};
use windows::core::{PCWSTR, w};

use crate::dpi;
use crate::wide::to_wide;

const CLASS_NAME: PCWSTR = w!("CruxWindow");

/// Posted to the owning thread when a window is dropped elsewhere.
const WM_CRUX_DESTROY: u32 = WM_APP + 1;

static REGISTER_CLASS: OnceLock<bool> = OnceLock::new();

/// A top-level Win32 window.
///
/// The `HWND` is kept as a [`NativeHandle`] so the backend can move
/// between threads. `WM_CLOSE` raises the window's close flag instead of
/// destroying it; the native window is destroyed when the backend drops.
///
/// An `HWND` belongs to the thread that created it, which must keep
/// pumping messages. From any other thread, moves and resizes are posted
/// asynchronously, title changes are refused, and dropping posts
/// [`WM_CRUX_DESTROY`] so the owner destroys the window.
pub struct Win32Backend {
    handle: NativeHandle,
    owner: ThreadId,
    // Keeps the atomic stored in GWLP_USERDATA alive.
    close: CloseFlag,
}

impl Win32Backend {
    fn hwnd(&self) -> HWND {
        HWND(self.handle.as_ptr())
    }

    fn on_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// `SetWindowPos` flags that never block on another thread's queue.
    fn pos_flags(&self, flags: SET_WINDOW_POS_FLAGS) -> SET_WINDOW_POS_FLAGS {
        if self.on_owner_thread() {
            flags
        } else {
            flags | SWP_ASYNCWINDOWPOS
        }
    }
}

fn ensure_class_registered(instance: HINSTANCE) -> WindowResult<()> {
    let registered = *REGISTER_CLASS.get_or_init(|| {
        let wc = WNDCLASSW {
            lpfnWndProc: Some(window_proc),
            hInstance: instance,
            // SAFETY: IDC_ARROW is a predefined system cursor.
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
            lpszClassName: CLASS_NAME,
            ..Default::default()
        };
        // SAFETY: `wc` is fully initialised and the class name is static.
        unsafe { RegisterClassW(&wc) != 0 }
    });

    if registered {
        Ok(())
    } else {
        Err("failed to register the CruxWindow class".into())
    }
}

/// WNDPROC for every Crux window.
///
/// Turns `WM_CLOSE` into a close request on the window's flag and
/// `WM_CRUX_DESTROY` into `DestroyWindow`. Everything else goes to
/// `DefWindowProcW`.
unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_CRUX_DESTROY {
        // SAFETY: the WNDPROC runs on the owning thread.
        if let Err(e) = unsafe { DestroyWindow(hwnd) } {
            crux_core::log_warn!("deferred DestroyWindow failed: {e}");
        }
        return LRESULT(0);
    }
    if msg == WM_CLOSE {
        let flag = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const AtomicBool;
        if !flag.is_null() {
            // SAFETY: the pointer is set from the backend's CloseFlag and
            // cleared in Drop before the flag can be freed.
            unsafe { (*flag).store(true, Ordering::Release) };
            return LRESULT(0);
        }
    }
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

/// Primary screen size in pixels.
fn screen_size() -> Vec2u {
    // SAFETY: GetSystemMetrics is a pure query.
    let (cx, cy) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
    Vec2u::new(u32::try_from(cx).unwrap_or(0), u32::try_from(cy).unwrap_or(0))
}

/// Initial `(x, y)` for `CreateWindowExW`.
///
/// Win32 only honours `CW_USEDEFAULT` on the x axis (y is then ignored),
/// so an OS-default y next to a known x falls back to the top edge.
fn initial_origin(props: &WindowProperties, screen: Vec2u) -> (i32, i32) {
    let (x_axis, y_axis) = props.placement();
    let x = x_axis.resolve(screen.x, props.width);
    let y = y_axis.resolve(screen.y, props.height);
    match (x, y) {
        (None, _) => (CW_USEDEFAULT, CW_USEDEFAULT),
        (Some(x), None) => (x, 0),
        (Some(x), Some(y)) => (x, y),
    }
}

/// Initial `(width, height)`; a zero extent lets the OS pick both.
fn initial_extent(props: &WindowProperties) -> (i32, i32) {
    match (i32::try_from(props.width), i32::try_from(props.height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
        _ => (CW_USEDEFAULT, CW_USEDEFAULT),
    }
}

impl PlatformBackend for Win32Backend {
    fn create(props: &WindowProperties, close: CloseFlag) -> WindowResult<Self> {
        dpi::enable_dpi_awareness();

        // SAFETY: a null module name returns the current executable.
        let instance = HINSTANCE(unsafe { GetModuleHandleW(PCWSTR::null()) }?.0);
        ensure_class_registered(instance)?;

        let (x, y) = initial_origin(props, screen_size());
        let (width, height) = initial_extent(props);
        let title = to_wide(&props.title);

        // SAFETY: the class is registered and `title` outlives the call.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                CLASS_NAME,
                PCWSTR(title.as_ptr()),
                WS_OVERLAPPEDWINDOW | WS_VISIBLE,
                x,
                y,
                width,
                height,
                None,
                None,
                Some(instance),
                None,
            )?
        };

        let handle =
            NativeHandle::from_raw(hwnd.0).ok_or("CreateWindowExW returned a null HWND")?;

        // SAFETY: valid HWND; the pointer stays valid while `close` lives.
        unsafe {
            SetWindowLongPtrW(
                hwnd,
                GWLP_USERDATA,
                close.as_atomic() as *const AtomicBool as isize,
            );
        }

        crux_core::log_debug!("created HWND {handle} at ({x},{y}) {width}x{height}");
        Ok(Self {
            handle,
            owner: thread::current().id(),
            close,
        })
    }

    fn set_title(&mut self, title: &str) -> WindowResult<()> {
        // WM_SETTEXT can't be posted, and sending it would block on the owner.
        if !self.on_owner_thread() {
            return Err("window title changed off its owning thread".into());
        }
        let wide = to_wide(title);
        // SAFETY: valid HWND; `wide` is NUL-terminated and outlives the call.
        unsafe { SetWindowTextW(self.hwnd(), PCWSTR(wide.as_ptr()))? };
        Ok(())
    }

    fn set_position(&mut self, position: Vec2i) -> WindowResult<()> {
        // SAFETY: SetWindowPos with a valid HWND is safe.
        unsafe {
            SetWindowPos(
                self.hwnd(),
                None,
                position.x,
                position.y,
                0,
                0,
                self.pos_flags(SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE),
            )?
        };
        Ok(())
    }

    fn set_size(&mut self, size: Vec2u) -> WindowResult<()> {
        let cx = i32::try_from(size.x).map_err(|_| "window width out of range")?;
        let cy = i32::try_from(size.y).map_err(|_| "window height out of range")?;

        // SAFETY: SetWindowPos with a valid HWND is safe.
        unsafe {
            SetWindowPos(
                self.hwnd(),
                None,
                0,
                0,
                cx,
                cy,
                self.pos_flags(SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE),
            )?
        };
        Ok(())
    }

    fn platform_handle(&self) -> Option<NativeHandle> {
        Some(self.handle)
    }
}

impl Drop for Win32Backend {
    fn drop(&mut self) {
        let hwnd = self.hwnd();
        // SAFETY: detach the close flag first so the WNDPROC can't reach it
        // once `self.close` is dropped. GWLP_USERDATA may be set from any
        // thread of the owning process.
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) };

        let result = if self.on_owner_thread() {
            // SAFETY: valid HWND destroyed on its own thread.
            unsafe { DestroyWindow(hwnd) }
        } else {
            // SAFETY: posting to a valid HWND; the owner's WNDPROC destroys it.
            unsafe { PostMessageW(Some(hwnd), WM_CRUX_DESTROY, WPARAM(0), LPARAM(0)) }
        };
        if let Err(e) = result {
            crux_core::log_warn!("could not destroy HWND {}: {e}", self.handle);
        }
        crux_core::log_debug!(
            "released HWND {} (close requested: {})",
            self.handle,
            self.close.get()
        );
    }
}
