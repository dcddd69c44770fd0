//! Plain-text puzzle boards.
//!
//! The first line holds `height width`; each following line is one row of
//! exactly `width` characters. A character's low two bits give the cell
//! color (0 unpainted, 1 red, 2 green, 3 blue) and bit 2 marks a star, so
//! `'0'..'7'` cover every cell. The robot start is not stored in the file.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::FormatError;
use crate::puzzle::{Direction, Position, Puzzle, TileColor};

const STAR_BIT: u8 = 0b100;

/// Parse a board and place the robot at `start` facing `direction`.
pub fn parse_puzzle(text: &str, start: Position, direction: Direction) -> Result<Puzzle, FormatError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(FormatError::MissingHeader)?;
    let (height, width) = parse_header(header)?;

    let rows: Vec<&[u8]> = lines.map(str::as_bytes).collect();
    if rows.len() != height {
        return Err(FormatError::RowCount {
            expected: height,
            found: rows.len(),
        });
    }

    let mut puzzle = Puzzle::new(width, height, start, direction);
    for (y, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(FormatError::RowWidth {
                row: y,
                expected: width,
                found: row.len(),
            });
        }
        for (x, &cell) in row.iter().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            puzzle.set_color(pos, TileColor::from_code(cell));
            puzzle.set_star(pos, cell & STAR_BIT != 0);
        }
    }

    Ok(puzzle)
}

fn parse_header(line: &str) -> Result<(usize, usize), FormatError> {
    let invalid = || FormatError::InvalidHeader(line.to_string());
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [height, width] = fields.as_slice() else {
        return Err(invalid());
    };
    let height: i64 = height.parse().map_err(|_| invalid())?;
    let width: i64 = width.parse().map_err(|_| invalid())?;

    match (usize::try_from(height), usize::try_from(width)) {
        (Ok(h), Ok(w)) if h > 0 && w > 0 => Ok((h, w)),
        _ => Err(FormatError::InvalidSize { width, height }),
    }
}

/// Read and parse a board file.
pub fn read_puzzle(
    path: impl AsRef<Path>,
    start: Position,
    direction: Direction,
) -> Result<Puzzle, FormatError> {
    let text = std::fs::read_to_string(path)?;
    parse_puzzle(&text, start, direction)
}

/// Render a board in the format [`parse_puzzle`] reads.
pub fn write_puzzle(puzzle: &Puzzle) -> String {
    let mut out = String::with_capacity((puzzle.width() + 1) * (puzzle.height() + 1));
    let _ = writeln!(out, "{} {}", puzzle.height(), puzzle.width());
    for y in 0..puzzle.height() {
        for x in 0..puzzle.width() {
            let pos = Position::new(x as i32, y as i32);
            let mut code = puzzle.color_at(pos).map_or(0, TileColor::code);
            if puzzle.has_star(pos) {
                code |= STAR_BIT;
            }
            out.push(char::from(b'0' + code));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn origin() -> (Position, Direction) {
        (Position::new(0, 0), Direction::Right)
    }

    #[test]
    fn test_parse_cell_codes() {
        let (start, dir) = origin();
        let puzzle = parse_puzzle("2 4\n1235\n0467\n", start, dir).unwrap();

        assert_eq!(puzzle.width(), 4);
        assert_eq!(puzzle.height(), 2);
        assert_eq!(puzzle.color_at(Position::new(0, 0)), Some(TileColor::Red));
        assert_eq!(puzzle.color_at(Position::new(1, 0)), Some(TileColor::Green));
        assert_eq!(puzzle.color_at(Position::new(2, 0)), Some(TileColor::Blue));
        assert_eq!(puzzle.color_at(Position::new(3, 0)), Some(TileColor::Red));
        assert!(puzzle.has_star(Position::new(3, 0)));
        assert_eq!(puzzle.color_at(Position::new(0, 1)), None);
        // '4' is a star on an unpainted cell
        assert_eq!(puzzle.color_at(Position::new(1, 1)), None);
        assert!(puzzle.has_star(Position::new(1, 1)));
        assert_eq!(puzzle.color_at(Position::new(3, 1)), Some(TileColor::Blue));
        assert_eq!(puzzle.star_count(), 4);
        assert_eq!(puzzle.start(), start);
    }

    #[test]
    fn test_any_byte_uses_low_bits() {
        let (start, dir) = origin();
        // 'A' is 0x41: red, no star. 'G' is 0x47: blue with a star.
        let puzzle = parse_puzzle("1 2\r\nAG\r\n", start, dir).unwrap();
        assert_eq!(puzzle.color_at(Position::new(0, 0)), Some(TileColor::Red));
        assert!(!puzzle.has_star(Position::new(0, 0)));
        assert_eq!(puzzle.color_at(Position::new(1, 0)), Some(TileColor::Blue));
        assert!(puzzle.has_star(Position::new(1, 0)));
    }

    #[test]
    fn test_header_errors() {
        let (start, dir) = origin();
        assert!(matches!(
            parse_puzzle("", start, dir),
            Err(FormatError::MissingHeader)
        ));
        assert!(matches!(
            parse_puzzle("3\n111\n", start, dir),
            Err(FormatError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse_puzzle("a b\n", start, dir),
            Err(FormatError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse_puzzle("0 3\n", start, dir),
            Err(FormatError::InvalidSize {
                width: 3,
                height: 0
            })
        ));
        assert!(matches!(
            parse_puzzle("-1 2\n", start, dir),
            Err(FormatError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_grid_shape_errors() {
        let (start, dir) = origin();
        assert!(matches!(
            parse_puzzle("2 3\n111\n", start, dir),
            Err(FormatError::RowCount {
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            parse_puzzle("2 3\n111\n11\n", start, dir),
            Err(FormatError::RowWidth {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_write_then_parse_preserves_board() {
        let text = "3 3\n150\n026\n347\n";
        let (start, dir) = origin();
        let puzzle = parse_puzzle(text, start, dir).unwrap();
        assert_eq!(write_puzzle(&puzzle), text);

        let reparsed = parse_puzzle(&write_puzzle(&puzzle), start, dir).unwrap();
        assert_eq!(reparsed.star_count(), puzzle.star_count());
        assert_eq!(reparsed.color_counts(), puzzle.color_counts());
    }

    #[test]
    fn test_read_puzzle_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1 3\n115\n").unwrap();

        let (start, dir) = origin();
        let puzzle = read_puzzle(file.path(), start, dir).unwrap();
        assert_eq!(puzzle.star_count(), 1);
        assert!(puzzle.validate().is_ok());

        let missing = read_puzzle(file.path().with_extension("missing"), start, dir);
        assert!(matches!(missing, Err(FormatError::Io(_))));
    }
}
