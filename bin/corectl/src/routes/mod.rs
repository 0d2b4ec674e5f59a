mod certificates;
mod create;
mod logs;
mod setup;

pub use certificates::certificates_zip;
pub use create::create;
pub use logs::logs_zip;
pub use setup::setup;
