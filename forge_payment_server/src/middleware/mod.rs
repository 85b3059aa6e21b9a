mod verify;

pub use verify::XVerifyMiddlewareFactory;
