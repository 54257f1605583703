//! Decoded mesh tables and their delimited text form.

use std::io::Write;

use glam::DVec4;
use vertex_stream_decode::{ComponentFormat, Components};

const COORDS: [&str; 4] = ["x", "y", "z", "w"];

/// One decoded vertex shader output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub format: ComponentFormat,
}

/// One vertex as referenced by the index sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRow {
    /// Position in the index sequence.
    pub vertex: usize,
    /// Biased index into the vertex buffer.
    pub index: u64,
    /// One value per column.
    pub values: Vec<Components>,
}

/// Post-vertex-shader data of one instance of one draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshTable {
    pub event_id: u32,
    pub instance: u32,
    pub columns: Vec<Column>,
    pub rows: Vec<MeshRow>,
}

impl MeshTable {
    /// Conventional base name for this table, e.g. `42-0`.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.event_id, self.instance)
    }

    /// Column headers: `VTX`, `IDX`, then `name.x`, `name.y`, ... per column.
    #[must_use]
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["VTX".to_string(), "IDX".to_string()];
        for column in &self.columns {
            let count = usize::from(column.format.component_count);
            for coord in COORDS.iter().take(count) {
                header.push(format!("{}.{coord}", column.name));
            }
        }
        header
    }

    /// Values of the first column, widened to 4-vectors. This is the
    /// position unless the export kept signature order.
    #[must_use]
    pub fn positions(&self) -> Vec<DVec4> {
        self.rows
            .iter()
            .filter_map(|row| row.values.first().map(Components::to_dvec4))
            .collect()
    }

    /// Write the header and one line per row, separated by `delimiter`.
    pub fn write_delimited<W: Write>(&self, mut writer: W, delimiter: &str) -> std::io::Result<()> {
        writeln!(writer, "{}", self.header().join(delimiter))?;

        for row in &self.rows {
            write!(writer, "{}{delimiter}{}", row.vertex, row.index)?;
            for value in &row.values {
                for component in value.iter() {
                    write!(writer, "{delimiter}{component:?}")?;
                }
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vertex_stream_decode::ComponentType;

    fn sample_table() -> MeshTable {
        MeshTable {
            event_id: 42,
            instance: 1,
            columns: vec![
                Column {
                    name: "pos".to_string(),
                    format: ComponentFormat::new(4, 4, ComponentType::Float),
                },
                Column {
                    name: "uv".to_string(),
                    format: ComponentFormat::new(2, 4, ComponentType::Float),
                },
            ],
            rows: vec![
                MeshRow {
                    vertex: 0,
                    index: 3,
                    values: vec![
                        Components::from_slice(&[1.0, 2.0, 3.0, 1.0]),
                        Components::from_slice(&[0.5, 0.25]),
                    ],
                },
                MeshRow {
                    vertex: 1,
                    index: 0,
                    values: vec![
                        Components::from_slice(&[-1.0, 0.0, 0.0, 1.0]),
                        Components::from_slice(&[0.0, 1.0]),
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_header() {
        assert_eq!(
            sample_table().header(),
            ["VTX", "IDX", "pos.x", "pos.y", "pos.z", "pos.w", "uv.x", "uv.y"]
        );
    }

    #[test]
    fn test_write_delimited() {
        let mut out = Vec::new();
        sample_table().write_delimited(&mut out, ", ").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "VTX, IDX, pos.x, pos.y, pos.z, pos.w, uv.x, uv.y\n\
             0, 3, 1.0, 2.0, 3.0, 1.0, 0.5, 0.25\n\
             1, 0, -1.0, 0.0, 0.0, 1.0, 0.0, 1.0\n"
        );
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_errors_are_returned() {
        let err = sample_table()
            .write_delimited(FailingWriter, ", ")
            .unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_positions_and_stem() {
        let table = sample_table();
        assert_eq!(
            table.positions(),
            vec![DVec4::new(1.0, 2.0, 3.0, 1.0), DVec4::new(-1.0, 0.0, 0.0, 1.0)]
        );
        assert_eq!(table.file_stem(), "42-1");
    }
}
