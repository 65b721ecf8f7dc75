use boardgen::connectivity::Topology;
use boardgen::errors::{BoardError, BoardResult};
use tracing::warn;

/// Generic parser for delimited strings that return fixed-size arrays
pub fn parse_delimited<T, const N: usize>(
    input: &str,
    delimiter: char,
    type_name: &str,
    parser: impl Fn(&str) -> Result<T, std::num::ParseIntError>,
) -> BoardResult<[T; N]>
where
    T: Copy + Default,
{
    let parts: Vec<&str> = input.split(delimiter).collect();
    if parts.len() != N {
        return Err(BoardError::InvalidArgument {
            reason: format!(
                "Invalid {type_name} format '{input}'. Expected {N} {delimiter}-separated values"
            ),
        });
    }

    let mut result = [T::default(); N];
    for (i, part) in parts.iter().enumerate() {
        result[i] = parser(part.trim()).map_err(|_| BoardError::InvalidArgument {
            reason: format!("Invalid {type_name} value: '{part}'"),
        })?;
    }

    Ok(result)
}

/// Parse size string "WIDTHxHEIGHT" with validation
pub fn parse_size(size_str: &str) -> BoardResult<(u32, u32)> {
    let [width, height] = parse_delimited::<u32, 2>(size_str, 'x', "size", |s| s.parse())?;

    if width == 0 || height == 0 {
        return Err(BoardError::InvalidArgument {
            reason: "Width and height must be greater than 0".to_string(),
        });
    }

    if width > 4096 || height > 4096 {
        return Err(BoardError::InvalidArgument {
            reason: "Width and height must not exceed 4096".to_string(),
        });
    }

    Ok((width, height))
}

/// Parse a start cell "X,Y"
pub fn parse_cell(cell_str: &str) -> BoardResult<(u32, u32)> {
    let [x, y] = parse_delimited::<u32, 2>(cell_str, ',', "start cell", |s| s.parse())?;
    Ok((x, y))
}

pub fn parse_topology(name: &str) -> BoardResult<Topology> {
    match name.trim().to_ascii_lowercase().as_str() {
        "four" | "4" => Ok(Topology::Four),
        "eight" | "8" => Ok(Topology::Eight),
        other => Err(BoardError::InvalidArgument {
            reason: format!("Unknown topology '{other}', expected 'four' or 'eight'"),
        }),
    }
}

/// Clamp a threshold fraction into [0.0, 1.0], warning when it was out of range
pub fn validate_fraction(name: &str, value: f32) -> f32 {
    if !(0.0..=1.0).contains(&value) {
        warn!("{name} {value} is out of range [0.0, 1.0], clamping to valid range");
        value.clamp(0.0, 1.0)
    } else {
        value
    }
}
