//! Loader for the line-oriented dataset format.
//!
//! ```text
//! # name num_points dim num_true_clusters
//! f1,f2,...,f_dim,label
//! ...
//! ```
//!
//! Points get timestamps 1..=num_points in file order. Blank lines are
//! skipped. A bad header, a bad point line, or fewer points than the header
//! declares fails the whole load.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use streamclust_core::Point;
use tracing::{info, warn};

use super::Dataset;
use crate::error::DatasetError;

/// Load a dataset file.
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = parse_dataset(BufReader::new(file)).map_err(|e| match e {
        DatasetError::Io { source, .. } => DatasetError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    info!(
        path = %path.display(),
        name = %dataset.name,
        points = dataset.num_points,
        dim = dataset.dim,
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Parse a dataset from any buffered reader.
pub fn parse_dataset<R: BufRead>(reader: R) -> Result<Dataset, DatasetError> {
    let mut lines = reader.lines().enumerate();

    let (name, num_points, dim, num_true_clusters) = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line.map_err(io_error)?;
                if line.trim().is_empty() {
                    continue;
                }
                break parse_header(&line)?;
            }
            None => return Err(DatasetError::MalformedHeader("empty input".into())),
        }
    };

    let mut points = Vec::with_capacity(num_points);
    for (idx, line) in lines {
        let line = line.map_err(io_error)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if points.len() == num_points {
            warn!(
                line = idx + 1,
                declared = num_points,
                "Ignoring lines past the declared point count"
            );
            break;
        }

        let timestamp = points.len() as u64 + 1;
        points.push(parse_point(trimmed, idx + 1, dim, timestamp)?);
    }

    if points.len() < num_points {
        return Err(DatasetError::Truncated {
            expected: num_points,
            actual: points.len(),
        });
    }

    Ok(Dataset {
        name,
        num_points,
        dim,
        num_true_clusters,
        points,
    })
}

fn io_error(source: std::io::Error) -> DatasetError {
    DatasetError::Io {
        path: "<reader>".into(),
        source,
    }
}

fn parse_header(line: &str) -> Result<(String, usize, usize, usize), DatasetError> {
    let body = line
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| DatasetError::MalformedHeader(format!("missing '#' in {:?}", line)))?;
    let fields: Vec<&str> = body.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(DatasetError::MalformedHeader(format!(
            "expected 'name num_points dim num_true_clusters', got {:?}",
            line
        )));
    }

    let number = |field: &str, what: &str| {
        field.parse::<usize>().map_err(|_| {
            DatasetError::MalformedHeader(format!("{} is not a non-negative integer: {:?}", what, field))
        })
    };
    let num_points = number(fields[1], "num_points")?;
    let dim = number(fields[2], "dim")?;
    let num_true_clusters = number(fields[3], "num_true_clusters")?;
    if dim == 0 {
        return Err(DatasetError::MalformedHeader("dim must be greater than 0".into()));
    }
    Ok((fields[0].to_string(), num_points, dim, num_true_clusters))
}

fn parse_point(line: &str, line_no: usize, dim: usize, timestamp: u64) -> Result<Point, DatasetError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != dim + 1 {
        return Err(DatasetError::malformed_line(
            line_no,
            format!("expected {} features and a label, got {} fields", dim, fields.len()),
        ));
    }

    let mut features = Vec::with_capacity(dim);
    for (i, field) in fields[..dim].iter().enumerate() {
        let value: f64 = field.parse().map_err(|_| {
            DatasetError::malformed_line(line_no, format!("feature {} is not a number: {:?}", i, field))
        })?;
        if !value.is_finite() {
            return Err(DatasetError::malformed_line(
                line_no,
                format!("feature {} is not finite: {}", i, value),
            ));
        }
        features.push(value);
    }

    let label: u64 = fields[dim].parse().map_err(|_| {
        DatasetError::malformed_line(line_no, format!("label is not an integer: {:?}", fields[dim]))
    })?;

    Ok(Point::new(features, timestamp).with_label(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Dataset, DatasetError> {
        parse_dataset(Cursor::new(text))
    }

    #[test]
    fn test_parse_valid_dataset() {
        let ds = parse("# toy 3 2 2\n0.5,1.0,1\n2.0, 3.5 ,2\n-1e2,0,1\n").unwrap();
        assert_eq!(ds.name, "toy");
        assert_eq!(ds.num_points, 3);
        assert_eq!(ds.dim, 2);
        assert_eq!(ds.num_true_clusters, 2);
        assert_eq!(ds.points[1].features, vec![2.0, 3.5]);
        assert_eq!(ds.points[2].features, vec![-100.0, 0.0]);
        assert_eq!(ds.points[1].label, Some(2));
        let stamps: Vec<u64> = ds.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(stamps, vec![1, 2, 3]);
        println!("[PASS] test_parse_valid_dataset");
    }

    #[test]
    fn test_blank_trailing_lines_ignored() {
        let ds = parse("# toy 1 1 1\n4.0,1\n\n\n").unwrap();
        assert_eq!(ds.points.len(), 1);
        println!("[PASS] test_blank_trailing_lines_ignored");
    }

    #[test]
    fn test_truncated_dataset_rejected() {
        let err = parse("# toy 3 1 1\n1.0,1\n2.0,1\n").unwrap_err();
        assert!(matches!(err, DatasetError::Truncated { expected: 3, actual: 2 }));
        println!("[PASS] test_truncated_dataset_rejected");
    }

    #[test]
    fn test_malformed_header_rejected() {
        assert!(matches!(parse("toy 3 1 1\n"), Err(DatasetError::MalformedHeader(_))));
        assert!(matches!(parse("# toy three 1 1\n"), Err(DatasetError::MalformedHeader(_))));
        assert!(matches!(parse("# toy 3 1\n"), Err(DatasetError::MalformedHeader(_))));
        assert!(matches!(parse(""), Err(DatasetError::MalformedHeader(_))));
        println!("[PASS] test_malformed_header_rejected");
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let err = parse("# toy 2 2 1\n1.0,2.0,1\n1.0,abc,1\n").unwrap_err();
        match err {
            DatasetError::MalformedLine { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("feature 1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = parse("# toy 1 2 1\n1.0,1\n").unwrap_err();
        assert!(matches!(err, DatasetError::MalformedLine { line: 2, .. }));

        let err = parse("# toy 1 1 1\n1.0,x\n").unwrap_err();
        assert!(err.to_string().contains("label"));
        println!("[PASS] test_malformed_line_reports_line_number");
    }

    #[test]
    fn test_extra_lines_ignored() {
        let ds = parse("# toy 1 1 1\n1.0,1\n2.0,1\n").unwrap();
        assert_eq!(ds.points.len(), 1);
        println!("[PASS] test_extra_lines_ignored");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_dataset(Path::new("/nonexistent/data.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/data.txt"));
        println!("[PASS] test_load_missing_file");
    }
}
