//! Pose rule evaluation.
//!
//! Turns one frame's keypoints into an ordered list of coaching hints. The
//! checks run in a fixed order and each hint is appended the moment its
//! check fires, so the order of the output is part of the contract:
//!
//! 1. guard  (wrists vs shoulders)      -> RAISE_GUARD
//! 2. chin   (nose vs shoulders)        -> LOWER_CHIN
//! 3. stance (hip centre vs shoulders)  -> MOVE_LEFT | MOVE_RIGHT | GOOD_STANCE
//! 4. block  (wrists vs nose)           -> BLOCK_HIGH
//!
//! A check whose landmarks are absent contributes nothing. Evaluation never
//! fails: a malformed landmark ends it at the first check that reads it and
//! the hints gathered so far are returned.

use crate::config::RulesConfig;
use crate::hint::{Hint, HintCode};
use crate::keypoints::{Keypoint, KeypointSet, Landmark};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("landmark {landmark} has a non-finite coordinate")]
    NonFinite { landmark: Landmark },
}

/// Evaluate with the default thresholds
pub fn evaluate(keypoints: &KeypointSet) -> Vec<Hint> {
    RuleEvaluator::default().evaluate(keypoints)
}

/// Stateless rule set parameterised by its thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluator {
    /// How far above the shoulder line the nose may sit
    pub chin_offset: f32,
    /// Allowed horizontal drift between hip and shoulder centres
    pub stance_offset: f32,
    /// Landmarks below this confidence count as absent
    pub min_visibility: f32,
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self::from_config(&RulesConfig::default())
    }
}

impl RuleEvaluator {
    pub fn from_config(config: &RulesConfig) -> Self {
        Self {
            chin_offset: config.chin_offset,
            stance_offset: config.stance_offset,
            min_visibility: config.min_visibility,
        }
    }

    pub fn evaluate(&self, keypoints: &KeypointSet) -> Vec<Hint> {
        let mut hints = Vec::new();
        if let Err(e) = self.run_checks(keypoints, &mut hints) {
            warn!("Pose evaluation stopped early ({} hints kept): {}", hints.len(), e);
        }
        hints
    }

    fn run_checks(&self, kp: &KeypointSet, hints: &mut Vec<Hint>) -> Result<(), RuleError> {
        let ls = self.point(kp, Landmark::LeftShoulder)?;
        let rs = self.point(kp, Landmark::RightShoulder)?;
        let shoulders = ls.zip(rs);

        // y grows downwards: a larger wrist y means the hands hang below the shoulders
        if let Some((ls, rs)) = shoulders {
            let lw = self.point(kp, Landmark::LeftWrist)?;
            let rw = self.point(kp, Landmark::RightWrist)?;
            if let Some((lw, rw)) = lw.zip(rw) {
                if mid(lw.y, rw.y) > mid(ls.y, rs.y) {
                    hints.push(Hint::warn(HintCode::RaiseGuard));
                }
            }
        }

        if let Some((ls, rs)) = shoulders {
            if let Some(n) = self.point(kp, Landmark::Nose)? {
                if n.y < mid(ls.y, rs.y) - self.chin_offset {
                    hints.push(Hint::warn(HintCode::LowerChin));
                }
            }
        }

        if let Some((ls, rs)) = shoulders {
            let lh = self.point(kp, Landmark::LeftHip)?;
            let rh = self.point(kp, Landmark::RightHip)?;
            if let Some((lh, rh)) = lh.zip(rh) {
                let hip_center = mid(lh.x, rh.x);
                let shoulder_center = mid(ls.x, rs.x);
                if (hip_center - shoulder_center).abs() > self.stance_offset {
                    let code = if hip_center < shoulder_center {
                        HintCode::MoveRight
                    } else {
                        HintCode::MoveLeft
                    };
                    hints.push(Hint::info(code));
                } else if hints.is_empty() {
                    // Only when neither guard nor chin fired; a block hint may still follow
                    hints.push(Hint::info(HintCode::GoodStance));
                }
            }
        }

        let lw = self.point(kp, Landmark::LeftWrist)?;
        let rw = self.point(kp, Landmark::RightWrist)?;
        let nose = self.point(kp, Landmark::Nose)?;
        if let (Some(lw), Some(rw), Some(n)) = (lw, rw, nose) {
            if lw.y < n.y || rw.y < n.y {
                hints.push(Hint::info(HintCode::BlockHigh));
            }
        }

        Ok(())
    }

    fn point<'a>(
        &self,
        kp: &'a KeypointSet,
        landmark: Landmark,
    ) -> Result<Option<&'a Keypoint>, RuleError> {
        match kp.visible(landmark, self.min_visibility) {
            Some(p) if !p.is_finite() => Err(RuleError::NonFinite { landmark }),
            other => Ok(other),
        }
    }
}

fn mid(a: f32, b: f32) -> f32 {
    (a + b) / 2.0
}
