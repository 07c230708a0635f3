use cashball_db::Dataset;
use cashball_db::models::{BALLS_PER_DRAW, CASH_BALL_MIN, validate_balls, validate_cash_ball};

use crate::config::{EvaluationMode, PredictorConfig};
use crate::error::PredictError;
use crate::metrics::accuracy;
use crate::split::DataSplit;

pub const N_CLASSES: usize = 4;

#[derive(Debug, Clone)]
enum TreeNode {
    Leaf {
        distribution: [f64; N_CLASSES],
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassPrediction {
    pub label: u8,
    pub probabilities: [f64; N_CLASSES],
}

/// CART classifier (Gini impurity) from the five main balls to the cash ball.
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    root: TreeNode,
}

impl DecisionTreeClassifier {
    /// Labels are cash balls in 1..=4.
    pub fn fit(
        features: &[[u8; 5]],
        labels: &[u8],
        max_depth: usize,
    ) -> Result<Self, PredictError> {
        if features.is_empty() {
            return Err(PredictError::InsufficientData { needed: 1, got: 0 });
        }
        if labels.len() != features.len() {
            return Err(PredictError::InsufficientData {
                needed: features.len(),
                got: labels.len(),
            });
        }
        if let Some(&bad) = labels.iter().find(|&&l| !validate_cash_ball(l)) {
            return Err(PredictError::InvalidLabel(bad));
        }

        let rows: Vec<[f64; 5]> = features
            .iter()
            .map(|f| f.map(|b| b as f64))
            .collect();
        let classes: Vec<usize> = labels.iter().map(|&l| (l - CASH_BALL_MIN) as usize).collect();
        let indices: Vec<usize> = (0..rows.len()).collect();

        let root = build_tree(&rows, &classes, &indices, max_depth);
        let tree = Self { root };
        log::debug!(
            "Decision tree fitted on {} draws: depth={}, leaves={}",
            rows.len(),
            tree.depth(),
            tree.leaf_count()
        );
        Ok(tree)
    }

    pub fn predict(&self, balls: &[u8; 5]) -> Result<ClassPrediction, PredictError> {
        validate_balls(balls)?;
        Ok(self.predict_unchecked(balls))
    }

    fn predict_unchecked(&self, balls: &[u8; 5]) -> ClassPrediction {
        let features = balls.map(|b| b as f64);
        let probabilities = predict_tree(&self.root, &features);
        let mut best = 0;
        for class in 1..N_CLASSES {
            if probabilities[class] > probabilities[best] {
                best = class;
            }
        }
        ClassPrediction {
            label: best as u8 + CASH_BALL_MIN,
            probabilities,
        }
    }

    pub fn depth(&self) -> usize {
        node_depth(&self.root)
    }

    pub fn leaf_count(&self) -> usize {
        node_leaves(&self.root)
    }
}

fn class_distribution(classes: &[usize], indices: &[usize]) -> [f64; N_CLASSES] {
    let mut counts = [0.0; N_CLASSES];
    for &i in indices {
        counts[classes[i]] += 1.0;
    }
    let total = indices.len().max(1) as f64;
    counts.map(|c| c / total)
}

fn gini_impurity(counts: &[usize; N_CLASSES], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

/// Best (feature, threshold, weighted gini) over all features, sweeping sorted values.
/// Ties keep the first feature and the lowest threshold.
fn best_split(
    rows: &[[f64; 5]],
    classes: &[usize],
    indices: &[usize],
) -> Option<(usize, f64, f64)> {
    let n = indices.len();
    let mut total_counts = [0usize; N_CLASSES];
    for &i in indices {
        total_counts[classes[i]] += 1;
    }

    let mut best: Option<(usize, f64, f64)> = None;

    for feat_idx in 0..BALLS_PER_DRAW {
        let mut sorted: Vec<(f64, usize)> = indices
            .iter()
            .map(|&i| (rows[i][feat_idx], classes[i]))
            .collect();
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left_counts = [0usize; N_CLASSES];
        for k in 0..n - 1 {
            left_counts[sorted[k].1] += 1;
            if sorted[k].0 == sorted[k + 1].0 {
                continue;
            }
            let n_left = k + 1;
            let n_right = n - n_left;
            let mut right_counts = total_counts;
            for c in 0..N_CLASSES {
                right_counts[c] -= left_counts[c];
            }
            let weighted = (n_left as f64 / n as f64) * gini_impurity(&left_counts, n_left)
                + (n_right as f64 / n as f64) * gini_impurity(&right_counts, n_right);

            if best.map_or(true, |(_, _, g)| weighted < g) {
                let threshold = (sorted[k].0 + sorted[k + 1].0) / 2.0;
                best = Some((feat_idx, threshold, weighted));
            }
        }
    }

    best
}

fn build_tree(
    rows: &[[f64; 5]],
    classes: &[usize],
    indices: &[usize],
    depth_left: usize,
) -> TreeNode {
    let distribution = class_distribution(classes, indices);

    let first = classes[indices[0]];
    let pure = indices.iter().all(|&i| classes[i] == first);
    if depth_left == 0 || indices.len() < 2 || pure {
        return TreeNode::Leaf { distribution };
    }

    let mut counts = [0usize; N_CLASSES];
    for &i in indices {
        counts[classes[i]] += 1;
    }
    let parent_gini = gini_impurity(&counts, indices.len());

    let (feature_idx, threshold, gini) = match best_split(rows, classes, indices) {
        Some(split) => split,
        None => return TreeNode::Leaf { distribution },
    };
    if gini >= parent_gini {
        return TreeNode::Leaf { distribution };
    }

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| rows[i][feature_idx] <= threshold);

    TreeNode::Split {
        feature_idx,
        threshold,
        left: Box::new(build_tree(rows, classes, &left, depth_left - 1)),
        right: Box::new(build_tree(rows, classes, &right, depth_left - 1)),
    }
}

fn predict_tree(node: &TreeNode, features: &[f64; 5]) -> [f64; N_CLASSES] {
    match node {
        TreeNode::Leaf { distribution } => *distribution,
        TreeNode::Split { feature_idx, threshold, left, right } => {
            if features[*feature_idx] <= *threshold {
                predict_tree(left, features)
            } else {
                predict_tree(right, features)
            }
        }
    }
}

fn node_depth(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 0,
        TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

fn node_leaves(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => node_leaves(left) + node_leaves(right),
    }
}

#[derive(Debug, Clone)]
pub struct ClassificationFit {
    pub model: DecisionTreeClassifier,
    pub mode: EvaluationMode,
    pub accuracy: f64,
    pub train_size: usize,
    pub eval_size: usize,
}

/// Fit five balls → cash ball on the dataset and score it according to the configured mode.
pub fn fit_classifier(
    dataset: &Dataset,
    config: &PredictorConfig,
) -> Result<ClassificationFit, PredictError> {
    let balls = dataset.balls()?;
    let labels: Vec<u8> = dataset.records().iter().map(|r| r.cash_ball).collect();

    let split = match config.evaluation {
        EvaluationMode::Full => DataSplit::full(dataset.len()),
        EvaluationMode::Holdout => {
            DataSplit::holdout(dataset.len(), config.holdout_fraction, config.holdout_seed)?
        }
    };

    let train_x: Vec<[u8; 5]> = split.train.iter().map(|&i| balls[i]).collect();
    let train_y: Vec<u8> = split.train.iter().map(|&i| labels[i]).collect();
    let model = DecisionTreeClassifier::fit(&train_x, &train_y, config.max_depth)?;

    let eval_y: Vec<u8> = split.test.iter().map(|&i| labels[i]).collect();
    let eval_pred: Vec<u8> = split
        .test
        .iter()
        .map(|&i| model.predict_unchecked(&balls[i]).label)
        .collect();

    Ok(ClassificationFit {
        model,
        mode: config.evaluation,
        accuracy: accuracy(&eval_y, &eval_pred),
        train_size: split.train.len(),
        eval_size: split.test.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_dataset;
    use cashball_db::DatasetError;

    fn assert_distribution(p: &[f64; N_CLASSES]) {
        for &x in p {
            assert!((0.0..=1.0).contains(&x), "probability {x}");
        }
        let sum: f64 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum = {sum}");
    }

    #[test]
    fn test_learns_threshold_on_first_ball() {
        let features = vec![
            [5, 20, 30, 40, 50],
            [8, 21, 31, 41, 51],
            [40, 22, 32, 42, 52],
            [45, 23, 33, 43, 53],
        ];
        let labels = vec![1, 1, 3, 3];
        let tree = DecisionTreeClassifier::fit(&features, &labels, 5).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&[2, 20, 30, 40, 50]).unwrap().label, 1);
        let pred = tree.predict(&[59, 20, 30, 40, 50]).unwrap();
        assert_eq!(pred.label, 3);
        assert_eq!(pred.probabilities, [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_depth_is_bounded() {
        let dataset = make_test_dataset(200);
        for max_depth in [1, 2, 5] {
            let config = PredictorConfig { max_depth, ..Default::default() };
            let fit = fit_classifier(&dataset, &config).unwrap();
            assert!(fit.model.depth() <= max_depth);
            assert!(fit.model.leaf_count() <= 1 << max_depth);
        }
    }

    #[test]
    fn test_probabilities_are_distributions() {
        let dataset = make_test_dataset(120);
        let fit = fit_classifier(&dataset, &PredictorConfig::default()).unwrap();
        let inputs = [
            [1, 2, 3, 4, 5],
            [60, 59, 58, 57, 56],
            [13, 27, 31, 44, 52],
            [30, 30, 30, 30, 30],
        ];
        for balls in inputs {
            let pred = fit.model.predict(&balls).unwrap();
            assert_distribution(&pred.probabilities);
            assert!((1..=4).contains(&pred.label));
        }
    }

    #[test]
    fn test_mixed_leaf_distribution_and_tie_break() {
        // Identical features, labels split 2/2 between 2 and 4: one leaf, lowest label wins.
        let features = vec![[10, 20, 30, 40, 50]; 4];
        let labels = vec![4, 2, 4, 2];
        let tree = DecisionTreeClassifier::fit(&features, &labels, 5).unwrap();
        assert_eq!(tree.leaf_count(), 1);
        let pred = tree.predict(&[10, 20, 30, 40, 50]).unwrap();
        assert_eq!(pred.probabilities, [0.0, 0.5, 0.0, 0.5]);
        assert_eq!(pred.label, 2);
    }

    #[test]
    fn test_predict_rejects_out_of_range() {
        let dataset = make_test_dataset(40);
        let fit = fit_classifier(&dataset, &PredictorConfig::default()).unwrap();
        assert!(matches!(
            fit.model.predict(&[0, 2, 3, 4, 5]),
            Err(PredictError::Dataset(DatasetError::BallOutOfRange { position: 1, value: 0 }))
        ));
        assert!(fit.model.predict(&[1, 2, 3, 4, 61]).is_err());
    }

    #[test]
    fn test_invalid_label() {
        let features = vec![[1, 2, 3, 4, 5]];
        assert!(matches!(
            DecisionTreeClassifier::fit(&features, &[5], 5),
            Err(PredictError::InvalidLabel(5))
        ));
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::prepare(Vec::new());
        assert!(matches!(
            fit_classifier(&dataset, &PredictorConfig::default()),
            Err(PredictError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let dataset = make_test_dataset(90);
        let config = PredictorConfig::default();
        let a = fit_classifier(&dataset, &config).unwrap();
        let b = fit_classifier(&dataset, &config).unwrap();
        let balls = [7, 19, 26, 38, 51];
        assert_eq!(a.model.predict(&balls).unwrap(), b.model.predict(&balls).unwrap());
        assert_eq!(a.accuracy, b.accuracy);
    }

    #[test]
    fn test_full_mode_accuracy_on_learnable_labels() {
        // make_test_dataset derives the cash ball from the first ball.
        let dataset = make_test_dataset(100);
        let fit = fit_classifier(&dataset, &PredictorConfig::default()).unwrap();
        assert!(fit.accuracy > 0.5, "accuracy = {}", fit.accuracy);
    }

    #[test]
    fn test_holdout_mode() {
        let dataset = make_test_dataset(100);
        let config = PredictorConfig { evaluation: EvaluationMode::Holdout, ..Default::default() };
        let fit = fit_classifier(&dataset, &config).unwrap();
        assert_eq!(fit.train_size, 80);
        assert_eq!(fit.eval_size, 20);
        assert!((0.0..=1.0).contains(&fit.accuracy));
    }
}
