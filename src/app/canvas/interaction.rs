use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{Pos2, Rect, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::circle_visible;
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    pub(in crate::app) fn visible_indices(rect: Rect, screen: &[(Pos2, f32)]) -> Vec<usize> {
        (0..screen.len())
            .filter(|&index| circle_visible(rect, screen[index].0, screen[index].1))
            .collect()
    }

    /// Closest point under the pointer. Later points win ties so children
    /// are picked over the owner they sit in.
    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen: &[(Pos2, f32)],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        visible_indices
            .iter()
            .rev()
            .filter_map(|&index| {
                let (position, radius) = screen[index];
                let distance = position.distance(pointer);
                (distance <= radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Indices of points whose label or id fuzzy-matches the search box.
    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.points_revision == self.points_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .points
            .iter()
            .enumerate()
            .filter_map(|(index, point)| {
                let label = point.entity.label();
                (fuzzy_match_score(&matcher, &label, query).is_some()
                    || fuzzy_match_score(&matcher, point.entity.id(), query).is_some())
                .then_some(index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            points_revision: self.points_revision,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }
}
