//! `Display` formatting for [`Matrix`].

use core::fmt;

use super::Matrix;

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "matrix([")?;
        for i in 0..self.rows {
            write!(f, "  [")?;
            for j in 0..self.columns {
                if j > 0 {
                    write!(f, ", ")?;
                }
                match f.precision() {
                    Some(p) => write!(f, "{:.*}", p, self.get(i, j))?,
                    None => write!(f, "{}", self.get(i, j))?,
                }
            }
            if i < self.rows - 1 {
                writeln!(f, "],")?;
            } else {
                writeln!(f, "]")?;
            }
        }
        write!(f, "], shape=({}, {}))", self.rows, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let m = Matrix::from_rows(2, 2, &[1.0, 2.5, -3.0, 4.0]).unwrap();
        assert_eq!(
            m.to_string(),
            "matrix([\n  [1, 2.5],\n  [-3, 4]\n], shape=(2, 2))"
        );
    }

    #[test]
    fn test_display_precision() {
        let m = Matrix::from_rows(1, 2, &[1.0, 0.333_333]).unwrap();
        assert_eq!(format!("{m:.2}"), "matrix([\n  [1.00, 0.33]\n], shape=(1, 2))");
    }
}
