use faer::{Mat, Side};
use faer::prelude::Solve;
use ndarray::{Array1, Array2};

use crate::error::PredictError;

/// Convert ndarray Array2 to faer Mat (column-major).
fn ndarray_to_faer(arr: &Array2<f64>) -> Mat<f64> {
    let (rows, cols) = (arr.nrows(), arr.ncols());
    Mat::from_fn(rows, cols, |i, j| arr[[i, j]])
}

/// Solve a symmetric positive-definite system via Cholesky factorization.
/// Returns x such that A * x = b.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, PredictError> {
    let a_faer = ndarray_to_faer(a);
    let b_faer = Mat::from_fn(b.len(), 1, |i, _| b[i]);
    let llt = match a_faer.llt(Side::Lower) {
        Ok(llt) => llt,
        Err(_) => {
            return Err(PredictError::DegenerateData(
                "normal equations are not positive-definite".to_string(),
            ))
        }
    };
    let x_faer = llt.solve(&b_faer);
    Ok(Array1::from_shape_fn(b.len(), |i| x_faer[(i, 0)]))
}

/// Ordinary least squares through the normal equations.
///
/// - design: [n_samples, n_coefs], include a column of ones for an intercept
/// - targets: [n_samples]
/// - Returns the coefficients [n_coefs]
pub fn least_squares(
    design: &Array2<f64>,
    targets: &Array1<f64>,
) -> Result<Array1<f64>, PredictError> {
    let (n, p) = design.dim();
    if n < p {
        return Err(PredictError::InsufficientData { needed: p, got: n });
    }
    let xtx = design.t().dot(design);
    let xty = design.t().dot(targets);
    let coefs = cholesky_solve(&xtx, &xty)?;
    if coefs.iter().any(|c| !c.is_finite()) {
        return Err(PredictError::DegenerateData(
            "least-squares solution is not finite".to_string(),
        ));
    }
    Ok(coefs)
}
