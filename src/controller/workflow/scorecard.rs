use serde::{Deserialize, Serialize};

use crate::model::{GolfCourse, Hole, Player};

pub const DEFAULT_MAX_HOLE: i32 = 18;

/// Course details the round builder needs: the holes in order and the highest
/// hole number, which is where the played sequence wraps back to 1.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CourseHoleInfo {
    pub golf_course_id: i64,
    pub course_name: String,
    pub club_name: String,
    pub max_hole: i32,
    pub holes: Vec<Hole>,
}

impl CourseHoleInfo {
    #[must_use]
    pub fn new(course: &GolfCourse, mut holes: Vec<Hole>) -> Self {
        holes.sort_by_key(|h| h.hole_number);
        let max_hole = holes
            .iter()
            .map(|h| h.hole_number)
            .max()
            .unwrap_or(DEFAULT_MAX_HOLE);
        Self {
            golf_course_id: course.golf_course_id,
            course_name: course.name.clone(),
            club_name: course.club_name.clone(),
            max_hole,
            holes,
        }
    }

    #[must_use]
    pub fn hole(&self, hole_number: i32) -> Option<&Hole> {
        self.holes.iter().find(|h| h.hole_number == hole_number)
    }
}

/// Hole numbers in the order they are played, wrapping past `max_hole` back to 1.
#[must_use]
pub fn played_hole_numbers(starting_hole: i32, holes_played: i32, max_hole: i32) -> Vec<i32> {
    if max_hole < 1 || holes_played < 1 {
        return vec![];
    }
    let count = holes_played.min(max_hole);
    let start = (starting_hole.max(1) - 1) % max_hole;
    (0..count).map(|i| (start + i) % max_hole + 1).collect()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HoleScoreEntry {
    pub hole_id: i64,
    pub hole_number: i32,
    pub par: i32,
    pub strokes: Option<i32>,
    pub putts: Option<i32>,
    pub fairway_hit: Option<bool>,
}

impl HoleScoreEntry {
    #[must_use]
    pub fn is_entered(&self) -> bool {
        self.strokes.is_some_and(|s| s > 0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlayerScorecard {
    pub player_id: i64,
    pub player_name: String,
    pub entries: Vec<HoleScoreEntry>,
}

impl PlayerScorecard {
    /// Blank rows for every played hole the course defines. Values already in
    /// `previous` are kept for holes that are still played.
    #[must_use]
    pub fn build(
        player: &Player,
        course: &CourseHoleInfo,
        hole_numbers: &[i32],
        previous: Option<&PlayerScorecard>,
    ) -> Self {
        let entries = hole_numbers
            .iter()
            .filter_map(|n| course.hole(*n))
            .map(|hole| {
                previous
                    .and_then(|card| card.entry(hole.hole_number))
                    .cloned()
                    .unwrap_or(HoleScoreEntry {
                        hole_id: hole.hole_id,
                        hole_number: hole.hole_number,
                        par: hole.par,
                        strokes: None,
                        putts: None,
                        fairway_hit: None,
                    })
            })
            .collect();
        Self {
            player_id: player.player_id,
            player_name: player.full_name(),
            entries,
        }
    }

    #[must_use]
    pub fn entry(&self, hole_number: i32) -> Option<&HoleScoreEntry> {
        self.entries.iter().find(|e| e.hole_number == hole_number)
    }

    pub fn entry_mut(&mut self, hole_number: i32) -> Option<&mut HoleScoreEntry> {
        self.entries.iter_mut().find(|e| e.hole_number == hole_number)
    }

    #[must_use]
    pub fn total_strokes(&self) -> i32 {
        self.entries.iter().filter_map(|e| e.strokes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlayerLink;

    fn course(max: i32) -> CourseHoleInfo {
        let course = GolfCourse {
            golf_course_id: 1,
            golf_club_id: 1,
            club_name: "Club".to_string(),
            name: "Links".to_string(),
            default_par: 72,
            number_of_holes: max,
        };
        let holes = (1..=max)
            .rev()
            .map(|n| Hole {
                hole_id: i64::from(n) + 100,
                golf_course_id: 1,
                hole_number: n,
                par: 4,
                stroke_index: None,
                length_yards: None,
            })
            .collect();
        CourseHoleInfo::new(&course, holes)
    }

    #[test]
    fn sequence_wraps_past_last_hole() {
        assert_eq!(played_hole_numbers(16, 5, 18), vec![16, 17, 18, 1, 2]);
        assert_eq!(played_hole_numbers(1, 9, 18), (1..=9).collect::<Vec<_>>());
        assert_eq!(played_hole_numbers(10, 9, 18), (10..=18).collect::<Vec<_>>());
    }

    #[test]
    fn sequence_never_exceeds_course() {
        assert_eq!(played_hole_numbers(3, 12, 9).len(), 9);
        assert_eq!(played_hole_numbers(20, 2, 18), vec![2, 3]);
        assert!(played_hole_numbers(1, 0, 18).is_empty());
    }

    #[test]
    fn course_without_holes_defaults_to_eighteen() {
        let info = CourseHoleInfo::new(
            &GolfCourse {
                golf_course_id: 2,
                golf_club_id: 1,
                club_name: String::new(),
                name: "Empty".to_string(),
                default_par: 72,
                number_of_holes: 18,
            },
            vec![],
        );
        assert_eq!(info.max_hole, DEFAULT_MAX_HOLE);
        assert_eq!(course(9).max_hole, 9);
        assert_eq!(course(9).holes[0].hole_number, 1);
    }

    #[test]
    fn rebuilding_keeps_entered_values() {
        let info = course(18);
        let player = Player {
            player_id: 7,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            handicap: None,
            link: PlayerLink::SelfLinked {
                user_id: "u1".to_string(),
            },
        };
        let mut card = PlayerScorecard::build(&player, &info, &[16, 17, 18], None);
        if let Some(entry) = card.entry_mut(17) {
            entry.strokes = Some(5);
        }
        let rebuilt = PlayerScorecard::build(&player, &info, &[17, 18, 1], Some(&card));
        let numbers: Vec<i32> = rebuilt.entries.iter().map(|e| e.hole_number).collect();
        assert_eq!(numbers, vec![17, 18, 1]);
        assert_eq!(rebuilt.entry(17).and_then(|e| e.strokes), Some(5));
        assert_eq!(rebuilt.total_strokes(), 5);
        assert_eq!(rebuilt.player_name, "Ann Lee");
    }
}
