#[cfg(feature = "logging")]
pub fn init_logger(
    min_level: log::LevelFilter, debug_file_name: &std::ffi::OsStr,
) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            // Note we aren't using local time since it only works on single-threaded processes.
            let offset = time::OffsetDateTime::now_utc();

            out.finish(format_args!(
                "{}[{}][{}] {}",
                offset
                    .format(&time::macros::format_description!(
                        // The weird "[[[" is because we need to escape a bracket ("[[") to show one "[".
                        // See https://time-rs.github.io/book/api/format-description.html
                        "[[[year]-[month]-[day]][[[hour]:[minute]:[second][subsecond digits:9]]"
                    ))
                    .unwrap_or_default(),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(min_level)
        .chain(fern::log_file(debug_file_name)?)
        .apply()?;

    Ok(())
}

#[cfg(test)]
mod test {
    #[cfg(feature = "logging")]
    #[test]
    fn init_writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sysgauge.log");

        // Only one logger can be installed per process, so this is the only test that does it.
        super::init_logger(log::LevelFilter::Trace, path.as_os_str()).unwrap();
        log::info!("logger test line");
        log::logger().flush();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("logger test line"));
        assert!(text.contains("[INFO]"));
    }
}
