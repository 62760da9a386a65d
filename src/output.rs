// src/output.rs
use crate::mc::driver::AdaptivePath;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Write the accepted grid of one path as `step,t,value,log_vol` rows.
pub fn write_path_to_csv(filename: &str, path: &AdaptivePath) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "step,t,value,log_vol")?;
    for (i, (t, y)) in path.times.iter().zip(&path.states).enumerate() {
        writeln!(file, "{},{},{},{}", i, t, y[0], y[1])?;
    }
    file.flush()
}

pub fn write_summary_to_csv(filename: &str, summary_data: &[(&str, &str)]) -> io::Result<()> {
    let mut file = File::create(filename)?;
    for (key, value) in summary_data {
        writeln!(file, "{},{}", key, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_path_to_csv() {
        let path = AdaptivePath {
            times: vec![0.0, 0.5],
            states: vec![[100.0, -1.0], [101.0, -1.1]],
            accepted: 1,
            rejected: 0,
        };
        let filename = std::env::temp_dir().join("sde_stepctl_path_test.csv");
        let filename = filename.to_str().unwrap();

        write_path_to_csv(filename, &path).unwrap();
        let content = std::fs::read_to_string(filename).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "step,t,value,log_vol");
        assert_eq!(lines[1], "0,0,100,-1");
        assert_eq!(lines[2], "1,0.5,101,-1.1");

        std::fs::remove_file(filename).ok();
    }
}
