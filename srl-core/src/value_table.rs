use serde::{Deserialize, Serialize};

/// Dense state-action value estimates, stored row major: one row of `n_actions` values per state.
/// The shape is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    n_states: usize,
    n_actions: usize,
    values: Vec<f64>,
}

impl QTable {
    pub fn zeros(n_states: usize, n_actions: usize) -> Self {
        Self {
            n_states,
            n_actions,
            values: vec![0.; n_states * n_actions],
        }
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn idx(&self, state: usize, action: usize) -> usize {
        assert!(
            state < self.n_states,
            "state {state} out of range for a table with {} states",
            self.n_states
        );
        assert!(
            action < self.n_actions,
            "action {action} out of range for a table with {} actions",
            self.n_actions
        );
        state * self.n_actions + action
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[self.idx(state, action)]
    }

    pub fn set(&mut self, state: usize, action: usize, value: f64) {
        let idx = self.idx(state, action);
        self.values[idx] = value;
    }

    pub fn row(&self, state: usize) -> &[f64] {
        assert!(
            state < self.n_states,
            "state {state} out of range for a table with {} states",
            self.n_states
        );
        let start = state * self.n_actions;
        &self.values[start..start + self.n_actions]
    }

    /// Index of the highest value in the row of `state`. Ties go to the lowest index.
    pub fn argmax(&self, state: usize) -> usize {
        let row = self.row(state);
        let mut best = 0;
        for (action, value) in row.iter().enumerate().skip(1) {
            if *value > row[best] {
                best = action;
            }
        }
        best
    }
}

#[cfg(test)]
mod test {
    use super::QTable;

    #[test]
    fn argmax_breaks_ties_by_first_index() {
        let mut table = QTable::zeros(2, 4);
        assert_eq!(table.argmax(0), 0);
        table.set(1, 2, 1.5);
        table.set(1, 3, 1.5);
        assert_eq!(table.argmax(1), 2);
        table.set(1, 0, -3.);
        assert_eq!(table.argmax(1), 2);
    }

    #[test]
    fn rows_are_laid_out_per_state() {
        let mut table = QTable::zeros(3, 2);
        table.set(2, 1, 4.);
        assert_eq!(table.row(2), &[0., 4.]);
        assert_eq!(table.values()[5], 4.);
        assert_eq!(table.get(2, 1), 4.);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_state_panics() {
        let table = QTable::zeros(3, 2);
        table.row(3);
    }
}
