//! Plain-text polygon mesh records (`v x y z`, `f i j k ...`).
//!
//! Only vertex positions and face position indices are read. Texture and
//! normal sub-indices (`f 1/4/2 ...`) are dropped, and every face is
//! fan-triangulated around its first vertex.

use std::fmt::Write as _;

/// Parsed mesh: flat `xyz` positions and flat triangle indices (0-based).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedMesh {
    pub vertices: Vec<f32>,
    pub faces: Vec<u32>,
}

impl ParsedMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.faces.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeshParseError {
    /// Input holds no characters besides whitespace.
    Empty,
    NoUsableGeometry { vertices: usize, faces: usize },
    InvalidNumber { line: usize, token: String },
    Malformed { line: usize, reason: &'static str },
    IndexOutOfRange { line: usize, index: i64, vertex_count: usize },
}

impl std::fmt::Display for MeshParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshParseError::Empty => write!(f, "mesh data is empty"),
            MeshParseError::NoUsableGeometry { vertices, faces } => write!(
                f,
                "no usable geometry (vertices={vertices}, faces={faces})"
            ),
            MeshParseError::InvalidNumber { line, token } => {
                write!(f, "line {line}: invalid number {token:?}")
            }
            MeshParseError::Malformed { line, reason } => write!(f, "line {line}: {reason}"),
            MeshParseError::IndexOutOfRange {
                line,
                index,
                vertex_count,
            } => write!(
                f,
                "line {line}: face index {index} out of range ({vertex_count} vertices)"
            ),
        }
    }
}

impl std::error::Error for MeshParseError {}

/// A face index still tied to its source line, checked once all vertices are known.
#[derive(Debug, Copy, Clone)]
struct PendingIndex {
    line: usize,
    raw: i64,
    resolved: i64,
}

pub fn parse(text: &str) -> Result<ParsedMesh, MeshParseError> {
    if text.trim().is_empty() {
        return Err(MeshParseError::Empty);
    }

    let mut vertices: Vec<f32> = Vec::new();
    let mut pending: Vec<PendingIndex> = Vec::new();

    for (line_idx, raw_line) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                for _ in 0..3 {
                    let token = tokens.next().ok_or(MeshParseError::Malformed {
                        line: line_no,
                        reason: "vertex needs three coordinates",
                    })?;
                    vertices.push(parse_f32(token, line_no)?);
                }
            }
            Some("f") => {
                let vertex_count = (vertices.len() / 3) as i64;
                let mut corners: Vec<PendingIndex> = Vec::new();
                for token in tokens {
                    let position = token.split('/').next().unwrap_or_default();
                    let raw: i64 =
                        position
                            .parse()
                            .map_err(|_| MeshParseError::InvalidNumber {
                                line: line_no,
                                token: token.to_string(),
                            })?;
                    let resolved = match raw {
                        0 => {
                            return Err(MeshParseError::Malformed {
                                line: line_no,
                                reason: "face index 0 is not valid (indices are 1-based)",
                            });
                        }
                        r if r > 0 => r - 1,
                        // Negative indices count back from the latest vertex.
                        r => vertex_count + r,
                    };
                    corners.push(PendingIndex {
                        line: line_no,
                        raw,
                        resolved,
                    });
                }
                fan_triangulate(&corners, &mut pending);
            }
            _ => {}
        }
    }

    let vertex_count = vertices.len() / 3;
    if vertex_count == 0 || pending.is_empty() {
        return Err(MeshParseError::NoUsableGeometry {
            vertices: vertex_count,
            faces: pending.len() / 3,
        });
    }

    let mut faces = Vec::with_capacity(pending.len());
    for idx in pending {
        if idx.resolved < 0 || idx.resolved >= vertex_count as i64 {
            return Err(MeshParseError::IndexOutOfRange {
                line: idx.line,
                index: idx.raw,
                vertex_count,
            });
        }
        faces.push(idx.resolved as u32);
    }

    Ok(ParsedMesh { vertices, faces })
}

/// `[a, b, c, d, ...]` becomes `(a, b, c), (a, c, d), ...`. Faces with fewer
/// than three corners produce nothing.
fn fan_triangulate(corners: &[PendingIndex], out: &mut Vec<PendingIndex>) {
    let Some((&first, rest)) = corners.split_first() else {
        return;
    };
    for pair in rest.windows(2) {
        out.extend([first, pair[0], pair[1]]);
    }
}

fn parse_f32(token: &str, line: usize) -> Result<f32, MeshParseError> {
    token.parse().map_err(|_| MeshParseError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

/// Writes positions and triangle indices back out as mesh text.
///
/// The output uses 1-based triangle faces and reparses with [`parse`].
pub fn write(vertices: &[f32], triangles: &[u32]) -> String {
    let mut out = String::with_capacity(vertices.len() * 12 + triangles.len() * 8);
    let _ = writeln!(
        out,
        "# {} vertices, {} triangles",
        vertices.len() / 3,
        triangles.len() / 3
    );
    for v in vertices.chunks_exact(3) {
        let _ = writeln!(out, "v {} {} {}", v[0], v[1], v[2]);
    }
    for t in triangles.chunks_exact(3) {
        let _ = writeln!(out, "f {} {} {}", t[0] + 1, t[1] + 1, t[2] + 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{MeshParseError, parse, write};
    use pretty_assertions::assert_eq;

    const CUBE: &str = "\
# unit cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
";

    #[test]
    fn pentagon_is_fan_triangulated() {
        let text = "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5\n";
        let mesh = parse(text).expect("parse");
        let tris: Vec<[u32; 3]> = mesh.triangles().collect();
        assert_eq!(tris, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    }

    #[test]
    fn cube_quads_become_twelve_triangles() {
        let mesh = parse(CUBE).expect("parse");
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn sub_indices_are_dropped() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/2/1 3//1\n";
        let mesh = parse(text).expect("parse");
        assert_eq!(mesh.faces, vec![0, 1, 2]);
    }

    #[test]
    fn negative_indices_are_relative() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = parse(text).expect("parse");
        assert_eq!(mesh.faces, vec![0, 1, 2]);
    }

    #[test]
    fn unknown_records_and_comments_are_ignored() {
        let text = "o thing\n# comment\n\nmtllib a.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\ns off\nf 1 2 3\n";
        let mesh = parse(text).expect("parse");
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn nan_coordinates_propagate() {
        let text = "v nan 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse(text).expect("parse");
        assert!(mesh.vertices[0].is_nan());
    }

    #[test]
    fn empty_and_faceless_inputs_are_errors() {
        assert_eq!(parse("   \n"), Err(MeshParseError::Empty));
        assert_eq!(
            parse("# nothing here\nv 0 0 0\n"),
            Err(MeshParseError::NoUsableGeometry {
                vertices: 1,
                faces: 0
            })
        );
        assert_eq!(
            parse("f 1 2 3\n"),
            Err(MeshParseError::NoUsableGeometry {
                vertices: 0,
                faces: 1
            })
        );
        assert_eq!(
            parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n"),
            Err(MeshParseError::IndexOutOfRange {
                line: 4,
                index: 4,
                vertex_count: 3
            })
        );
    }

    #[test]
    fn garbage_numbers_are_reported_with_line() {
        let err = parse("v 0 0 0\nv 1 zero 0\n").unwrap_err();
        assert_eq!(
            err,
            MeshParseError::InvalidNumber {
                line: 2,
                token: "zero".to_string()
            }
        );
    }

    #[test]
    fn written_text_reparses() {
        let mesh = parse(CUBE).expect("parse");
        let text = write(&mesh.vertices, &mesh.faces);
        let again = parse(&text).expect("reparse");
        assert_eq!(again, mesh);
    }
}
