//! Derivative-free minimisation used to estimate smoothing parameters:
//! a coarse brute-force grid plus a bounded Nelder–Mead refinement.

/// Nelder–Mead settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Stop when the spread of objective values across the simplex falls
    /// below `tolerance * (1 + |best|)`.
    pub tolerance: f64,
    /// Initial simplex edge as a fraction of each bound's width.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 500,
            tolerance: 1e-10,
            initial_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadResult {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimise `objective` inside the box `bounds`, starting from `x0`.
///
/// Every trial point is projected onto the box. Non-finite objective values
/// are treated as `+inf`.
pub fn nelder_mead<F>(
    objective: F,
    x0: &[f64],
    bounds: &[(f64, f64)],
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = x0.len();
    let project = |x: &mut Vec<f64>| {
        for (xi, (lo, hi)) in x.iter_mut().zip(bounds) {
            *xi = xi.clamp(*lo, *hi);
        }
    };
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let mut start = x0.to_vec();
    project(&mut start);

    if n == 0 {
        let value = eval(&start);
        return NelderMeadResult {
            point: start,
            value,
            iterations: 0,
            converged: true,
        };
    }

    // Initial simplex: x0 plus one step along each axis, stepping inwards at an upper bound.
    let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
    simplex.push((start.clone(), eval(&start)));
    for i in 0..n {
        let (lo, hi) = bounds.get(i).copied().unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
        let width = if (hi - lo).is_finite() { hi - lo } else { 1.0 };
        let step = (config.initial_step * width).max(1e-6);
        let mut v = start.clone();
        v[i] = if v[i] + step <= hi { v[i] + step } else { v[i] - step };
        project(&mut v);
        let f = eval(&v);
        simplex.push((v, f));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let best = simplex[0].1;
        let worst = simplex[n].1;
        if !best.is_finite() {
            break;
        }
        if (worst - best).abs() <= config.tolerance * (1.0 + best.abs()) {
            converged = true;
            break;
        }
        iterations += 1;

        let mut centroid = vec![0.0; n];
        for (x, _) in &simplex[..n] {
            for (c, xi) in centroid.iter_mut().zip(x) {
                *c += xi / n as f64;
            }
        }

        let along = |coef: f64, from: &[f64]| -> Vec<f64> {
            let mut p: Vec<f64> = centroid
                .iter()
                .zip(from)
                .map(|(c, f)| c + coef * (f - c))
                .collect();
            project(&mut p);
            p
        };

        let worst_point = simplex[n].0.clone();
        let reflected = along(-REFLECTION, &worst_point);
        let f_reflected = eval(&reflected);

        if f_reflected < best {
            let expanded = along(-REFLECTION * EXPANSION, &worst_point);
            let f_expanded = eval(&expanded);
            simplex[n] = if f_expanded < f_reflected {
                (expanded, f_expanded)
            } else {
                (reflected, f_reflected)
            };
            continue;
        }

        if f_reflected < simplex[n - 1].1 {
            simplex[n] = (reflected, f_reflected);
            continue;
        }

        let (contracted, f_contracted) = if f_reflected < worst {
            let p = along(-REFLECTION * CONTRACTION, &worst_point);
            let f = eval(&p);
            (p, f)
        } else {
            let p = along(CONTRACTION, &worst_point);
            let f = eval(&p);
            (p, f)
        };

        if f_contracted < f_reflected.min(worst) {
            simplex[n] = (contracted, f_contracted);
            continue;
        }

        let anchor = simplex[0].0.clone();
        for vertex in simplex.iter_mut().skip(1) {
            let mut p: Vec<f64> = anchor
                .iter()
                .zip(&vertex.0)
                .map(|(a, x)| a + SHRINK * (x - a))
                .collect();
            project(&mut p);
            let f = eval(&p);
            *vertex = (p, f);
        }
    }

    simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
    let (point, value) = simplex.swap_remove(0);
    NelderMeadResult {
        point,
        value,
        iterations,
        converged,
    }
}

/// Cartesian product of the given axes (one starting point per combination).
pub fn brute_force_grid(axes: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut grid: Vec<Vec<f64>> = vec![Vec::new()];
    for axis in axes {
        let mut next = Vec::with_capacity(grid.len() * axis.len());
        for prefix in &grid {
            for v in axis {
                let mut p = prefix.clone();
                p.push(*v);
                next.push(p);
            }
        }
        grid = next;
    }
    grid
}
