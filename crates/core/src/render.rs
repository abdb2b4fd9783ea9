//! Draws the lattice as one polyline per column.
//!
//! The whole surface is cleared and the full path reissued every frame. Every
//! point but the last of a column is drawn fully displaced; the last point is
//! drawn without its cursor offset, and the path then moves to that same
//! undisplaced point before the next column starts its own subpath. This
//! keeps the column tails from smearing when the pointer drags them.

use crate::grid::Grid;
use crate::surface::{StrokeStyle, Surface};
use glam::DVec2;

/// Rounds to one decimal place before handing coordinates to the surface.
/// Halves round toward positive infinity, so `-1.25` becomes `-1.2`.
fn round_tenth(v: f64) -> f64 {
    (v * 10.0 + 0.5).floor() / 10.0
}

fn issue_point(p: DVec2) -> (f64, f64) {
    (round_tenth(p.x), round_tenth(p.y))
}

/// Clears `surface` and strokes every column of `grid` as a single path.
///
/// An empty grid clears the surface and issues nothing else.
pub fn draw<S: Surface + ?Sized>(grid: &Grid, surface: &mut S, style: &StrokeStyle) {
    surface.clear();
    if grid.is_empty() {
        return;
    }

    surface.begin_path();
    let last = grid.rows() - 1;
    for column in 0..grid.columns() {
        let (x, y) = issue_point(grid.displaced(column, 0, false));
        surface.move_to(x, y);
        for row in 0..=last {
            let is_last = row == last;
            let (x, y) = issue_point(grid.displaced(column, row, !is_last));
            surface.line_to(x, y);
            if is_last {
                surface.move_to(x, y);
            }
        }
    }
    surface.stroke(style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaveConfig;
    use crate::surface::recording::{Command, RecordingSurface};

    fn style() -> StrokeStyle {
        WaveConfig::default().stroke_style()
    }

    #[test]
    fn empty_grid_only_clears() {
        let mut surface = RecordingSurface::new(0.0, 0.0);
        draw(&Grid::empty(), &mut surface, &style());
        assert_eq!(surface.commands, vec![Command::Clear]);
    }

    #[test]
    fn clears_before_drawing_and_strokes_once() {
        let grid = Grid::rebuild(100.0, 50.0, 20.0, 25.0);
        let mut surface = RecordingSurface::new(100.0, 50.0);
        draw(&grid, &mut surface, &style());
        assert_eq!(surface.commands[0], Command::Clear);
        assert_eq!(surface.commands[1], Command::BeginPath);
        assert_eq!(surface.commands.last(), Some(&Command::Stroke));
        assert_eq!(surface.count(|c| *c == Command::Stroke), 1);
    }

    #[test]
    fn issues_one_subpath_per_column() {
        let grid = Grid::rebuild(100.0, 50.0, 20.0, 25.0);
        let mut surface = RecordingSurface::new(100.0, 50.0);
        draw(&grid, &mut surface, &style());
        let line_tos = surface.count(|c| matches!(c, Command::LineTo(..)));
        let move_tos = surface.count(|c| matches!(c, Command::MoveTo(..)));
        assert_eq!(line_tos, grid.len());
        assert_eq!(move_tos, grid.columns() * 2);
    }

    #[test]
    fn last_point_of_each_column_skips_cursor_offset() {
        let mut grid = Grid::rebuild(40.0, 40.0, 20.0, 20.0);
        grid.cursor.iter_mut().for_each(|c| *c = DVec2::new(5.0, 7.0));
        let mut surface = RecordingSurface::new(40.0, 40.0);
        draw(&grid, &mut surface, &style());

        let rows = grid.rows();
        let per_column = 1 + rows + 1;
        for column in 0..grid.columns() {
            let start = 2 + column * per_column;
            let cmds = &surface.commands[start..start + per_column];

            let head = grid.base(column, 0);
            assert_eq!(cmds[0], Command::MoveTo(head.x, head.y));

            for row in 0..rows - 1 {
                let p = grid.base(column, row) + DVec2::new(5.0, 7.0);
                assert_eq!(cmds[1 + row], Command::LineTo(p.x, p.y));
            }

            let tail = grid.base(column, rows - 1);
            assert_eq!(cmds[rows], Command::LineTo(tail.x, tail.y));
            assert_eq!(cmds[rows + 1], Command::MoveTo(tail.x, tail.y));
        }
    }

    #[test]
    fn coordinates_are_rounded_to_one_decimal() {
        let mut grid = Grid::rebuild(10.0, 10.0, 10.0, 10.0);
        grid.wave.iter_mut().for_each(|w| *w = DVec2::new(0.123_456, 0.987_654));
        let mut surface = RecordingSurface::new(10.0, 10.0);
        draw(&grid, &mut surface, &style());
        for cmd in &surface.commands {
            if let Command::MoveTo(x, y) | Command::LineTo(x, y) = cmd {
                for v in [x, y] {
                    let scaled = v * 10.0;
                    assert!((scaled - scaled.round()).abs() < 1e-9, "not rounded: {v}");
                }
            }
        }
    }

    #[test]
    fn round_tenth_behaves() {
        assert_eq!(round_tenth(1.26), 1.3);
        assert_eq!(round_tenth(-1.24), -1.2);
        assert_eq!(round_tenth(3.0), 3.0);
        assert_eq!(round_tenth(-1.25), -1.2);
        assert_eq!(round_tenth(-0.05), 0.0);
        assert_eq!(round_tenth(2.25), 2.3);
    }
}
