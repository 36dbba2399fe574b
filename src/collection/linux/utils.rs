use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

/// Calls `f` for every line of a procfs/sysfs file.
///
/// The same buffer is reused for each line, which saves us from doing a string
/// allocation on each iteration compared to `lines()`.
pub(crate) fn for_each_line(path: impl AsRef<Path>, mut f: impl FnMut(&str)) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        f(line.trim_end_matches('\n'));
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_every_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first\nsecond\nthird").unwrap();

        let mut lines = Vec::new();
        for_each_line(file.path(), |line| lines.push(line.to_string())).unwrap();

        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(for_each_line("/definitely/not/a/real/file", |_| {}).is_err());
    }
}
