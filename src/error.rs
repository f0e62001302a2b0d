use quick_error::quick_error;
use std::io;
use std::path::PathBuf;

quick_error! {
    #[derive(Debug)]
    pub enum Error {
        MissingAnimation(path: PathBuf) {
            display("animation file not found: {}", path.display())
        }
        NoFrames {
            display("animation contains no frames")
        }
        Decode(err: image::ImageError) {
            from()
            display("could not decode animation: {}", err)
        }
        Io(err: io::Error) {
            from()
            display("I/O: {}", err)
        }
        Icon(msg: String) {
            display("bad tray icon: {}", msg)
            from(e: tray_icon::BadIcon) -> (e.to_string())
        }
        Tray(msg: String) {
            display("tray error: {}", msg)
            from(e: tray_icon::Error) -> (e.to_string())
            from(e: tray_icon::menu::Error) -> (e.to_string())
        }
        EventLoop(msg: String) {
            display("event loop error: {}", msg)
            from(e: winit::error::EventLoopError) -> (e.to_string())
        }
    }
}

pub type BounceResult<T, E = Error> = Result<T, E>;
