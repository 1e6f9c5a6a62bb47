pub mod notice;
pub mod pages;
pub mod route;
pub mod upload;

pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use route::{Resolution, Route, resolve};
pub use upload::UploadPage;
