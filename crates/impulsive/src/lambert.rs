//! Lambert boundary-value solver with multi-revolution support.
//!
//! Universal-variable formulation as the primary method; transfer angles
//! approaching 180 degrees are routed to the geometric fallback in
//! [`crate::battin`], which is also used when the primary fails to converge.
//! The solver never errors: infeasible geometry yields an empty list.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use transit_core::vector::{self, Vector3};

use crate::battin;
use crate::stumpff;

/// Relative tolerance on the time-of-flight residual.
pub const LAMBERT_TIME_TOL: f64 = 1e-10;
/// Iteration cap for the bracketed psi search.
pub const LAMBERT_MAX_ITER: u32 = 60;
/// Below this cosine of the transfer angle the universal formulation is
/// ill-conditioned and the geometric fallback takes over.
pub const BATTIN_COS_DNU_THRESHOLD: f64 = -0.95;
/// Hyperbolic floor of the psi bracket.
const PSI_FLOOR: f64 = -4.0 * PI * PI;

/// Which side of the transfer geometry a solution lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Short,
    Long,
}

/// One branch of the Lambert problem: terminal velocities in km/s.
#[derive(Debug, Clone, Copy)]
pub struct LambertSolution {
    pub v1_km_s: Vector3,
    pub v2_km_s: Vector3,
    pub revolutions: u32,
    pub kind: PathKind,
}

struct UvGeometry {
    r1n: f64,
    r2n: f64,
    a_geom: f64,
    sqrt_mu: f64,
}

/// Solve the Lambert problem between two heliocentric-frame positions.
///
/// Returns every converged branch: exactly one zero-revolution solution when
/// feasible, and up to two (short/long path) per revolution count up to
/// `max_revs`. Solutions are ordered by revolution count, then path kind.
pub fn solve(
    r1_km: &Vector3,
    r2_km: &Vector3,
    tof_s: f64,
    mu_km3_s2: f64,
    max_revs: u32,
    retrograde: bool,
) -> Vec<LambertSolution> {
    let r1n = vector::norm(r1_km);
    let r2n = vector::norm(r2_km);
    if !(tof_s > 0.0) || !(mu_km3_s2 > 0.0) || r1n < 1e-6 || r2n < 1e-6 {
        return Vec::new();
    }

    let cos_dnu = (vector::dot(r1_km, r2_km) / (r1n * r2n)).clamp(-1.0, 1.0);
    if 1.0 - cos_dnu < 1e-12 {
        // departure and arrival directions coincide
        return Vec::new();
    }
    let normal = vector::cross(r1_km, r2_km);
    let short_way = (normal[2] >= 0.0) != retrograde;
    let dnu = if short_way {
        cos_dnu.acos()
    } else {
        TAU - cos_dnu.acos()
    };

    let mut solutions = Vec::new();

    if cos_dnu < BATTIN_COS_DNU_THRESHOLD {
        for revs in 0..=max_revs {
            solutions.extend(battin::solve_geometric(
                r1_km, r2_km, tof_s, mu_km3_s2, revs, dnu, retrograde,
            ));
        }
    } else {
        let sin_mag = (1.0 - cos_dnu * cos_dnu).max(0.0).sqrt();
        let sin_dnu = if short_way { sin_mag } else { -sin_mag };
        let geom = UvGeometry {
            r1n,
            r2n,
            a_geom: sin_dnu * (r1n * r2n / (1.0 - cos_dnu)).sqrt(),
            sqrt_mu: mu_km3_s2.sqrt(),
        };

        let zero_rev_kind = if dnu <= PI {
            PathKind::Short
        } else {
            PathKind::Long
        };
        match solve_zero_rev(&geom, tof_s) {
            Some(psi) => {
                if let Some((v1, v2)) = branch_velocities(&geom, r1_km, r2_km, psi, mu_km3_s2) {
                    solutions.push(LambertSolution {
                        v1_km_s: v1,
                        v2_km_s: v2,
                        revolutions: 0,
                        kind: zero_rev_kind,
                    });
                }
            }
            None => {
                solutions.extend(battin::solve_geometric(
                    r1_km, r2_km, tof_s, mu_km3_s2, 0, dnu, retrograde,
                ));
            }
        }

        for revs in 1..=max_revs {
            for (psi, kind) in solve_multi_rev(&geom, tof_s, revs) {
                if let Some((v1, v2)) = branch_velocities(&geom, r1_km, r2_km, psi, mu_km3_s2) {
                    solutions.push(LambertSolution {
                        v1_km_s: v1,
                        v2_km_s: v2,
                        revolutions: revs,
                        kind,
                    });
                }
            }
        }
    }

    solutions.sort_by(|a, b| {
        a.revolutions
            .cmp(&b.revolutions)
            .then(a.kind.cmp(&b.kind))
    });
    solutions
}

/// Universal-variable time of flight for a given psi, plus the intermediate
/// `y`. `None` marks regions where the branch is undefined (y < 0).
fn universal_tof(g: &UvGeometry, psi: f64) -> Option<(f64, f64)> {
    let c2 = stumpff::c2(psi);
    let c3 = stumpff::c3(psi);
    if c2 <= 0.0 {
        return None;
    }
    let y = g.r1n + g.r2n + g.a_geom * (psi * c3 - 1.0) / c2.sqrt();
    if y < 0.0 {
        return None;
    }
    let chi = (y / c2).sqrt();
    let t = (chi.powi(3) * c3 + g.a_geom * y.sqrt()) / g.sqrt_mu;
    t.is_finite().then_some((t, y))
}

/// Terminal velocities from the f and g functions at a converged psi.
fn branch_velocities(
    g: &UvGeometry,
    r1: &Vector3,
    r2: &Vector3,
    psi: f64,
    mu: f64,
) -> Option<(Vector3, Vector3)> {
    let (_, y) = universal_tof(g, psi)?;
    let f = 1.0 - y / g.r1n;
    let g_lagr = g.a_geom * (y / mu).sqrt();
    if g_lagr.abs() < 1e-12 {
        return None;
    }
    let g_dot = 1.0 - y / g.r2n;
    let v1 = vector::scale(&vector::sub(r2, &vector::scale(r1, f)), 1.0 / g_lagr);
    let v2 = vector::scale(&vector::sub(&vector::scale(r2, g_dot), r1), 1.0 / g_lagr);
    (vector::norm(&v1).is_finite() && vector::norm(&v2).is_finite()).then_some((v1, v2))
}

/// Zero-revolution psi: TOF is monotonically increasing over the bracket.
fn solve_zero_rev(g: &UvGeometry, tof: f64) -> Option<f64> {
    let hi_cap = TAU * TAU * (1.0 - 1e-9);

    // Establish a valid lower endpoint. Where the geometry parameter is
    // positive the branch is undefined (y < 0) below some hyperbolic psi and
    // TOF falls to zero at that boundary, so bisecting onto the boundary
    // makes the bracket cover arbitrarily fast transfers.
    let mut lo = PSI_FLOOR;
    let mut t_lo = match universal_tof(g, lo) {
        Some((t, _)) => t,
        None => {
            let mut bad = lo;
            let mut good = 0.0;
            while universal_tof(g, good).is_none() {
                good = 0.5 * (good + hi_cap);
                if hi_cap - good < 1e-9 {
                    return None;
                }
            }
            for _ in 0..80 {
                let mid = 0.5 * (bad + good);
                if universal_tof(g, mid).is_some() {
                    good = mid;
                } else {
                    bad = mid;
                }
            }
            lo = good;
            universal_tof(g, lo)?.0
        }
    };
    // Extend downward when the requested TOF is faster than the floor allows.
    let mut expansions = 0;
    while t_lo > tof {
        let next = lo * 2.0;
        expansions += 1;
        if expansions > 16 || next >= lo {
            return None;
        }
        match universal_tof(g, next) {
            Some((t, _)) => {
                lo = next;
                t_lo = t;
            }
            None => return None,
        }
    }

    // Spec'd elliptic ceiling, pushed toward the full-revolution asymptote
    // until it contains the requested TOF.
    let mut hi = PI * PI;
    let mut t_hi = loop {
        match universal_tof(g, hi) {
            Some((t, _)) if t >= tof => break t,
            _ => {
                if hi_cap - hi < 1e-9 {
                    return None;
                }
                hi = hi_cap - 0.5 * (hi_cap - hi);
            }
        }
    };

    bracketed_root(
        lo,
        t_lo,
        hi,
        t_hi,
        tof,
        |psi| universal_tof(g, psi).map(|(t, _)| t),
    )
}

/// Multi-revolution branches: the TOF curve over the N-rev psi window is
/// convex with one interior minimum; each side holds at most one root.
fn solve_multi_rev(g: &UvGeometry, tof: f64, revs: u32) -> Vec<(f64, PathKind)> {
    let n = revs as f64;
    let window_lo = (TAU * n).powi(2) * (1.0 + 1e-9) + 1e-9;
    let window_hi = (TAU * (n + 1.0)).powi(2) * (1.0 - 1e-9);

    let Some((psi_min, t_min)) = minimize_tof(g, window_lo, window_hi) else {
        return Vec::new();
    };
    if tof < t_min {
        return Vec::new();
    }

    let mut roots = Vec::new();

    // left arm: decreasing toward the minimum
    if let Some((t_edge, _)) = universal_tof(g, window_lo) {
        if t_edge >= tof {
            if let Some(psi) = bracketed_root(window_lo, -t_edge, psi_min, -t_min, -tof, |psi| {
                universal_tof(g, psi).map(|(t, _)| -t)
            }) {
                roots.push((psi, PathKind::Short));
            }
        }
    }
    // right arm: increasing away from the minimum
    if let Some((t_edge, _)) = universal_tof(g, window_hi) {
        if t_edge >= tof {
            if let Some(psi) = bracketed_root(psi_min, t_min, window_hi, t_edge, tof, |psi| {
                universal_tof(g, psi).map(|(t, _)| t)
            }) {
                roots.push((psi, PathKind::Long));
            }
        }
    }
    roots
}

/// Ternary search for the interior TOF minimum of a multi-rev window.
fn minimize_tof(g: &UvGeometry, lo: f64, hi: f64) -> Option<(f64, f64)> {
    let mut a = lo;
    let mut b = hi;
    for _ in 0..120 {
        let m1 = a + (b - a) / 3.0;
        let m2 = b - (b - a) / 3.0;
        let t1 = universal_tof(g, m1).map_or(f64::INFINITY, |(t, _)| t);
        let t2 = universal_tof(g, m2).map_or(f64::INFINITY, |(t, _)| t);
        if t1 <= t2 {
            b = m2;
        } else {
            a = m1;
        }
    }
    let psi = 0.5 * (a + b);
    universal_tof(g, psi).map(|(t, _)| (psi, t))
}

/// Bracketed Illinois false-position search for `f(x) = target`, `f`
/// monotonically increasing on [lo, hi]. `None` from `f` marks an undefined
/// region below the valid range.
fn bracketed_root(
    mut lo: f64,
    t_lo: f64,
    mut hi: f64,
    t_hi: f64,
    target: f64,
    mut f: impl FnMut(f64) -> Option<f64>,
) -> Option<f64> {
    let mut f_lo = t_lo - target;
    let mut f_hi = t_hi - target;
    if f_lo > 0.0 || f_hi < 0.0 {
        return None;
    }
    let mut side = 0i8;
    for _ in 0..LAMBERT_MAX_ITER {
        let denom = f_hi - f_lo;
        let mut x = if denom.abs() > f64::MIN_POSITIVE {
            hi - f_hi * (hi - lo) / denom
        } else {
            0.5 * (lo + hi)
        };
        if !(x > lo && x < hi) {
            x = 0.5 * (lo + hi);
        }
        let Some(t) = f(x) else {
            lo = x;
            side = 0;
            continue;
        };
        let fx = t - target;
        if fx.abs() <= LAMBERT_TIME_TOL * target.abs().max(1.0) {
            return Some(x);
        }
        if fx < 0.0 {
            lo = x;
            f_lo = fx;
            if side == -1 {
                f_hi *= 0.5;
            }
            side = -1;
        } else {
            hi = x;
            f_hi = fx;
            if side == 1 {
                f_lo *= 0.5;
            }
            side = 1;
        }
    }
    None
}
