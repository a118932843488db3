mod logger;

pub use logger::Logger;

/// Installs the pretty-printing stderr logger as the global `log` backend.
pub fn init(level: log::LevelFilter) {
	log::set_max_level(level);
	log::set_logger(&Logger).expect("logger already installed");
}
