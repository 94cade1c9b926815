//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - radial profile: `.` line
//! - fitted valley parabola: `-` line
//! - extrema: `P` (peak), `V` (valley)

use crate::descriptors::RoundDiagnostics;
use crate::math::ParabolaFit;

/// Render one round's radial profile (distance vs. curve index).
pub fn render_profile_plot(
    round: &RoundDiagnostics,
    parabola: Option<&ParabolaFit>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let profile: Vec<(f64, f64)> = round
        .profile
        .iter()
        .enumerate()
        .map(|(i, &r)| (i as f64, r))
        .collect();
    let x_max = (profile.len().max(2) - 1) as f64;

    let (y_min, y_max) = y_range(&round.profile).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    draw_curve(&mut grid, &profile, x_max, y_min, y_max, '.');

    if let Some(parabola) = parabola {
        let visible: Vec<(f64, f64)> = parabola
            .samples
            .iter()
            .filter(|p| p.x <= x_max && p.y >= y_min && p.y <= y_max)
            .map(|p| (p.x, p.y))
            .collect();
        draw_curve(&mut grid, &visible, x_max, y_min, y_max, '-');
    }

    // Markers go last so they are never hidden.
    for (extrema, ch) in [(&round.peaks, 'P'), (&round.valleys, 'V')] {
        for e in extrema.iter() {
            let x = map_x(e.index as f64, 0.0, x_max, width);
            let y = map_y(e.value, y_min, y_max, height);
            grid[y][x] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Radial profile (round {}): index=[0, {x_max}] | r=[{y_min:.3}, {y_max:.3}]\n",
        round.round
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn y_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &y in values {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64, ch: char) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, 0.0, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, ch),
            None if grid[row][col] == ' ' => grid[row][col] = ch,
            None => {}
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Extremum, fit_parabola};
    use nalgebra::Point2;

    fn v_shaped_round() -> RoundDiagnostics {
        RoundDiagnostics {
            round: 3,
            center: Point2::origin(),
            circle: None,
            profile: (0..11).map(|i| (i as f64 - 5.0).abs()).collect(),
            peaks: vec![
                Extremum { index: 0, value: 5.0 },
                Extremum { index: 10, value: 5.0 },
            ],
            valleys: vec![Extremum { index: 5, value: 0.0 }],
        }
    }

    #[test]
    fn markers_land_on_their_extrema() {
        let txt = render_profile_plot(&v_shaped_round(), None, 11, 6);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Radial profile (round 3): index=[0, 10] | r=[-0.250, 5.250]");
        assert_eq!(lines[1].chars().next(), Some('P'));
        assert_eq!(lines[1].chars().nth(10), Some('P'));
        assert_eq!(lines[6].chars().nth(5), Some('V'));
        // Profile fills the cells between markers.
        assert!(lines[3].contains('.'));
    }

    #[test]
    fn parabola_is_drawn_inside_the_plot() {
        let round = v_shaped_round();
        let xs = [2.0, 5.0, 8.0];
        let ys = [3.0, 0.0, 3.0];
        let parabola = fit_parabola(&xs, &ys).unwrap();
        let with = render_profile_plot(&round, Some(&parabola), 40, 12);
        let without = render_profile_plot(&round, None, 40, 12);
        assert!(with.lines().skip(1).any(|l| l.contains('-')));
        assert!(!without.lines().skip(1).any(|l| l.contains('-')));
    }

    #[test]
    fn flat_profile_does_not_panic() {
        let mut round = v_shaped_round();
        round.profile = vec![1.0; 20];
        round.peaks.clear();
        round.valleys.clear();
        let txt = render_profile_plot(&round, None, 10, 5);
        assert_eq!(txt.lines().count(), 6);
    }
}
