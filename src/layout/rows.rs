use eframe::egui::{Pos2, pos2};

use super::grid::Region;

/// Share of a lane's height used by the quality offset.
const QUALITY_SWING: f32 = 0.6;
const QUALITY_SCALE: f32 = 10.0;

/// One horizontal lane per distinct lane key, in first-appearance order.
///
/// Items share their lane evenly along x; higher quality sits higher in the
/// lane.
pub fn row_positions<S: AsRef<str>>(items: &[(S, f32)], region: Region) -> Vec<Pos2> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut lanes: Vec<(&str, Vec<usize>)> = Vec::new();
    for (index, (lane, _)) in items.iter().enumerate() {
        let lane = lane.as_ref();
        match lanes.iter_mut().find(|(key, _)| *key == lane) {
            Some((_, members)) => members.push(index),
            None => lanes.push((lane, vec![index])),
        }
    }

    let lane_height = region.span() / lanes.len() as f32;
    let mut positions = vec![pos2(region.min, region.min); items.len()];
    for (lane_index, (_, members)) in lanes.iter().enumerate() {
        let center_y = region.min + (lane_index as f32 + 0.5) * lane_height;
        let step = region.span() / members.len() as f32;
        for (slot, &index) in members.iter().enumerate() {
            let quality = items[index].1;
            let quality = if quality.is_finite() {
                (quality / QUALITY_SCALE).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let x = region.min + (slot as f32 + 0.5) * step;
            let y = center_y - (quality - 0.5) * lane_height * QUALITY_SWING;
            positions[index] = region.clamp(pos2(x, y));
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_follow_first_appearance() {
        let items = [("nurse", 5.0), ("admin", 5.0), ("nurse", 5.0)];
        let positions = row_positions(&items, Region::new(0.0, 100.0));

        assert_eq!(positions[0], pos2(25.0, 25.0));
        assert_eq!(positions[2], pos2(75.0, 25.0));
        assert_eq!(positions[1], pos2(50.0, 75.0));
    }

    #[test]
    fn better_quality_sits_higher() {
        let items = [("lane", 9.0), ("lane", 1.0)];
        let positions = row_positions(&items, Region::new(10.0, 90.0));
        assert!(positions[0].y < positions[1].y);
    }

    #[test]
    fn positions_stay_in_region() {
        let items = (0..40)
            .map(|index| (format!("lane-{}", index % 7), (index % 11) as f32))
            .collect::<Vec<_>>();
        let region = Region::new(10.0, 90.0);
        for position in row_positions(&items, region) {
            assert!(region.contains(position));
        }
    }
}
