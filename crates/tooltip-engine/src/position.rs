//! Tooltip placement relative to the cursor

use tooltip_shared::{Position, Shift, Size, Viewport};

/// Place a tooltip next to the cursor, flipping it to the left of (or above)
/// the cursor when it would overflow the visible window.
pub fn compute_position(cursor: Position, tooltip: Size, viewport: Viewport, shift: Shift) -> Position {
    let total_width = tooltip.width + shift.x;
    let total_height = tooltip.height + shift.y;

    let x = if cursor.x - viewport.scroll_x > viewport.inner_width - total_width {
        cursor.x - total_width
    } else {
        cursor.x + shift.x
    };

    let y = if cursor.y - viewport.scroll_y > viewport.inner_height - total_height {
        cursor.y - total_height
    } else {
        cursor.y + shift.y
    };

    Position { x, y }
}
