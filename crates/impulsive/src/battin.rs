//! Geometric Lambert fallback for transfer angles approaching 180 degrees.
//!
//! Parameterised by the chord and semi-perimeter of the transfer triangle
//! (Lagrange's formulation), with elliptic and hyperbolic branches. Terminal
//! velocities are recovered from the conic's radial/transverse components,
//! which stay well-defined where the endpoint position vectors are nearly
//! collinear and the universal formulation's geometry parameter vanishes.

use std::f64::consts::{PI, TAU};
use transit_core::vector::{self, Vector3};

use crate::lambert::{LambertSolution, PathKind};

/// Relative tolerance on the time-of-flight residual.
const TIME_TOL: f64 = 1e-10;
/// Bisection cap for the semi-major-axis search.
const MAX_ITER: u32 = 128;
/// Doubling cap while expanding the upper semi-major-axis bracket.
const MAX_EXPANSIONS: u32 = 120;
/// Below this fraction of |r1||r2| the endpoint cross product is treated as
/// degenerate and the orbit plane defaults to the fundamental plane.
const COLLINEAR_EPS: f64 = 1e-8;

/// All converged branches for one revolution count. Zero revolutions yield
/// at most one solution; each N >= 1 yields at most two.
pub(crate) fn solve_geometric(
    r1: &Vector3,
    r2: &Vector3,
    tof_s: f64,
    mu: f64,
    revs: u32,
    dnu: f64,
    retrograde: bool,
) -> Vec<LambertSolution> {
    let r1n = vector::norm(r1);
    let r2n = vector::norm(r2);
    let chord = vector::norm(&vector::sub(r2, r1));
    let s = 0.5 * (r1n + r2n + chord);
    if !(s > 0.0) || !(tof_s > 0.0) || !(mu > 0.0) || chord < 1e-9 {
        return Vec::new();
    }
    let Some(n_hat) = plane_normal(r1, r2, dnu, retrograde) else {
        return Vec::new();
    };
    let sigma = if dnu < PI { 1.0 } else { -1.0 };
    let geom = Triangle {
        s,
        chord,
        r1n,
        r2n,
        sigma,
        mu,
    };

    let t_parabolic =
        2.0_f64.sqrt() / 3.0 * (s.powf(1.5) - sigma * (s - chord).max(0.0).powf(1.5)) / mu.sqrt();

    let mut out = Vec::new();
    if revs == 0 && tof_s < t_parabolic * (1.0 - 1e-12) {
        if let Some((p, a)) = solve_hyperbolic(&geom, tof_s) {
            if let Some((v1, v2)) = conic_velocities(r1, r2, r1n, r2n, &n_hat, dnu, p, a, mu) {
                out.push(LambertSolution {
                    v1_km_s: v1,
                    v2_km_s: v2,
                    revolutions: 0,
                    kind: zero_rev_kind(dnu),
                });
            }
        }
    } else {
        for (idx, (p, a)) in solve_elliptic(&geom, tof_s, revs).into_iter().enumerate() {
            if let Some((v1, v2)) = conic_velocities(r1, r2, r1n, r2n, &n_hat, dnu, p, a, mu) {
                let kind = if revs == 0 {
                    zero_rev_kind(dnu)
                } else if idx == 0 {
                    PathKind::Short
                } else {
                    PathKind::Long
                };
                out.push(LambertSolution {
                    v1_km_s: v1,
                    v2_km_s: v2,
                    revolutions: revs,
                    kind,
                });
            }
        }
    }
    out
}

fn zero_rev_kind(dnu: f64) -> PathKind {
    if dnu <= PI {
        PathKind::Short
    } else {
        PathKind::Long
    }
}

struct Triangle {
    s: f64,
    chord: f64,
    r1n: f64,
    r2n: f64,
    sigma: f64,
    mu: f64,
}

/// Orbit-plane normal: the endpoint cross product where it is usable, the
/// fundamental-plane normal for (anti)parallel endpoints.
fn plane_normal(r1: &Vector3, r2: &Vector3, dnu: f64, retrograde: bool) -> Option<Vector3> {
    let c = vector::cross(r1, r2);
    let scale_ref = COLLINEAR_EPS * vector::norm(r1) * vector::norm(r2);
    match vector::hat(&c, scale_ref) {
        Some(n) => Some(if dnu > PI { vector::scale(&n, -1.0) } else { n }),
        None => Some(if retrograde {
            [0.0, 0.0, -1.0]
        } else {
            [0.0, 0.0, 1.0]
        }),
    }
}

/// Lagrange time of flight on the elliptic branch for semi-major axis `a`.
fn elliptic_tof(g: &Triangle, a: f64, revs: u32, conjugate: bool) -> f64 {
    let alpha0 = 2.0 * (g.s / (2.0 * a)).sqrt().min(1.0).asin();
    let beta0 = 2.0 * ((g.s - g.chord).max(0.0) / (2.0 * a)).sqrt().min(1.0).asin();
    let alpha = if conjugate { TAU - alpha0 } else { alpha0 };
    let beta = g.sigma * beta0;
    (a.powi(3) / g.mu).sqrt() * (TAU * revs as f64 + (alpha - alpha.sin()) - (beta - beta.sin()))
}

/// Semi-latus rectum of the elliptic branch for semi-major axis `a`.
fn elliptic_p(g: &Triangle, a: f64, conjugate: bool) -> f64 {
    let alpha0 = 2.0 * (g.s / (2.0 * a)).sqrt().min(1.0).asin();
    let beta0 = 2.0 * ((g.s - g.chord).max(0.0) / (2.0 * a)).sqrt().min(1.0).asin();
    let alpha = if conjugate { TAU - alpha0 } else { alpha0 };
    let beta = g.sigma * beta0;
    4.0 * a * (g.s - g.r1n) * (g.s - g.r2n) / (g.chord * g.chord)
        * (0.5 * (alpha + beta)).sin().powi(2)
}

/// Hyperbolic time of flight for |a| = `ah`.
fn hyperbolic_tof(g: &Triangle, ah: f64) -> f64 {
    let gamma = 2.0 * (g.s / (2.0 * ah)).sqrt().asinh();
    let delta = 2.0 * ((g.s - g.chord).max(0.0) / (2.0 * ah)).sqrt().asinh();
    let d = g.sigma * delta;
    (ah.powi(3) / g.mu).sqrt() * ((gamma.sinh() - gamma) - (d.sinh() - d))
}

fn hyperbolic_p(g: &Triangle, ah: f64) -> f64 {
    let gamma = 2.0 * (g.s / (2.0 * ah)).sqrt().asinh();
    let delta = 2.0 * ((g.s - g.chord).max(0.0) / (2.0 * ah)).sqrt().asinh();
    4.0 * ah * (g.s - g.r1n) * (g.s - g.r2n) / (g.chord * g.chord)
        * (0.5 * (gamma + g.sigma * delta)).sinh().powi(2)
}

/// Hyperbolic branch: TOF grows monotonically with |a| toward the parabolic
/// limit, so a plain bracketed bisection suffices.
fn solve_hyperbolic(g: &Triangle, tof: f64) -> Option<(f64, f64)> {
    let mut lo = 1e-9 * g.s;
    let mut hi = g.s;
    let mut expansions = 0;
    while hyperbolic_tof(g, hi) < tof {
        hi *= 2.0;
        expansions += 1;
        if expansions > MAX_EXPANSIONS {
            return None;
        }
    }
    while hyperbolic_tof(g, lo) > tof {
        lo *= 0.5;
        expansions += 1;
        if expansions > MAX_EXPANSIONS {
            return None;
        }
    }
    let mut ah = 0.5 * (lo + hi);
    for _ in 0..MAX_ITER {
        let t = hyperbolic_tof(g, ah);
        if ((t - tof) / tof).abs() < TIME_TOL {
            break;
        }
        if t < tof {
            lo = ah;
        } else {
            hi = ah;
        }
        ah = 0.5 * (lo + hi);
    }
    let p = hyperbolic_p(g, ah);
    (p > 0.0 && p.is_finite()).then_some((p, -ah))
}

/// Elliptic branches. Zero revolutions has exactly one root: on the
/// principal-alpha branch (TOF falling from the minimum-energy time toward
/// the parabolic limit) or its conjugate (TOF rising without bound). For
/// N >= 1 the principal branch has an interior minimum, giving up to two
/// roots, with the conjugate branch supplying the second root above the
/// minimum-energy time.
fn solve_elliptic(g: &Triangle, tof: f64, revs: u32) -> Vec<(f64, f64)> {
    let a_min = 0.5 * g.s;
    let t_me = elliptic_tof(g, a_min * (1.0 + 1e-13), revs, false);

    let mut roots: Vec<f64> = Vec::new();
    if revs == 0 {
        let root = if tof <= t_me {
            bisect_a(g, tof, revs, false, a_min * (1.0 + 1e-12), false)
        } else {
            bisect_a(g, tof, revs, true, a_min * (1.0 + 1e-12), true)
        };
        if let Some(a) = root {
            return vec![(elliptic_p(g, a, tof > t_me), a)];
        }
        return Vec::new();
    }

    // principal branch: locate the interior minimum, then probe both arms
    let a_lo = a_min * (1.0 + 1e-12);
    let mut a_hi = a_min * 4.0;
    let mut expansions = 0;
    while elliptic_tof(g, a_hi, revs, false) < tof && expansions < MAX_EXPANSIONS {
        a_hi *= 2.0;
        expansions += 1;
    }
    let (a_star, t_min) = minimize_elliptic(g, a_lo, a_hi, revs);
    if tof >= t_min {
        if elliptic_tof(g, a_lo, revs, false) >= tof {
            if let Some(a) = bisect_between(g, tof, revs, false, a_lo, a_star, false) {
                roots.push(a);
            }
        }
        if elliptic_tof(g, a_hi, revs, false) >= tof {
            if let Some(a) = bisect_between(g, tof, revs, false, a_star, a_hi, true) {
                roots.push(a);
            }
        }
    }
    // conjugate branch: monotonically increasing from the minimum-energy time
    if tof >= t_me {
        if let Some(a) = bisect_a(g, tof, revs, true, a_lo, true) {
            roots.push(a);
        }
    }

    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|a, b| ((*a - *b) / *b).abs() < 1e-9);
    roots
        .into_iter()
        .take(2)
        .map(|a| {
            // recover which branch the root solves
            let on_principal =
                ((elliptic_tof(g, a, revs, false) - tof) / tof).abs() < 1e-6;
            (elliptic_p(g, a, !on_principal), a)
        })
        .collect()
}

/// Interior TOF minimum of the principal multi-rev branch via ternary search.
fn minimize_elliptic(g: &Triangle, lo: f64, hi: f64, revs: u32) -> (f64, f64) {
    let mut a = lo;
    let mut b = hi;
    for _ in 0..120 {
        let m1 = a + (b - a) / 3.0;
        let m2 = b - (b - a) / 3.0;
        if elliptic_tof(g, m1, revs, false) <= elliptic_tof(g, m2, revs, false) {
            b = m2;
        } else {
            a = m1;
        }
    }
    let a_star = 0.5 * (a + b);
    (a_star, elliptic_tof(g, a_star, revs, false))
}

/// Bisect one monotonic branch, expanding the upper bracket as needed.
fn bisect_a(
    g: &Triangle,
    tof: f64,
    revs: u32,
    conjugate: bool,
    a_lo: f64,
    increasing: bool,
) -> Option<f64> {
    let mut hi = a_lo * 2.0;
    let mut expansions = 0;
    loop {
        let t = elliptic_tof(g, hi, revs, conjugate);
        let contains = if increasing { t >= tof } else { t <= tof };
        if contains {
            break;
        }
        hi *= 2.0;
        expansions += 1;
        if expansions > MAX_EXPANSIONS {
            return None;
        }
    }
    bisect_between(g, tof, revs, conjugate, a_lo, hi, increasing)
}

fn bisect_between(
    g: &Triangle,
    tof: f64,
    revs: u32,
    conjugate: bool,
    mut lo: f64,
    mut hi: f64,
    increasing: bool,
) -> Option<f64> {
    let mut a = 0.5 * (lo + hi);
    for _ in 0..MAX_ITER {
        let t = elliptic_tof(g, a, revs, conjugate);
        if ((t - tof) / tof).abs() < TIME_TOL {
            return Some(a);
        }
        let go_up = if increasing { t < tof } else { t > tof };
        if go_up {
            lo = a;
        } else {
            hi = a;
        }
        a = 0.5 * (lo + hi);
    }
    // bisection exhausts the bracket at machine precision; accept the
    // midpoint when the residual is still acceptable for downstream use
    let t = elliptic_tof(g, a, revs, conjugate);
    (((t - tof) / tof).abs() < 1e-6).then_some(a)
}

/// Terminal velocities from the conic elements: radial/transverse
/// decomposition about the orbit normal.
fn conic_velocities(
    r1: &Vector3,
    r2: &Vector3,
    r1n: f64,
    r2n: f64,
    n_hat: &Vector3,
    dnu: f64,
    p: f64,
    a: f64,
    mu: f64,
) -> Option<(Vector3, Vector3)> {
    if !(p > 0.0) || !p.is_finite() {
        return None;
    }
    let e2 = (1.0 - p / a).max(0.0);
    let ecos1 = p / r1n - 1.0;
    let esin_mag = (e2 - ecos1 * ecos1).max(0.0).sqrt();
    let (cosd, sind) = (dnu.cos(), dnu.sin());
    let target = p / r2n - 1.0;
    // ascending/descending ambiguity: keep the sign consistent with r2
    let resid_pos = (ecos1 * cosd - esin_mag * sind - target).abs();
    let resid_neg = (ecos1 * cosd + esin_mag * sind - target).abs();
    let esin1 = if resid_neg < resid_pos {
        -esin_mag
    } else {
        esin_mag
    };
    let esin2 = esin1 * cosd + ecos1 * sind;

    let r1_hat = vector::hat(r1, 1e-9)?;
    let r2_hat = vector::hat(r2, 1e-9)?;
    let t1_hat = vector::cross(n_hat, &r1_hat);
    let t2_hat = vector::cross(n_hat, &r2_hat);
    let v_radial = (mu / p).sqrt();
    let h = (mu * p).sqrt();

    let v1 = vector::add(
        &vector::scale(&r1_hat, v_radial * esin1),
        &vector::scale(&t1_hat, h / r1n),
    );
    let v2 = vector::add(
        &vector::scale(&r2_hat, v_radial * esin2),
        &vector::scale(&t2_hat, h / r2n),
    );
    (vector::norm(&v1).is_finite() && vector::norm(&v2).is_finite()).then_some((v1, v2))
}
