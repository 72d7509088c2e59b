use super::MultiError;

// Ordering of the failures by message. The order of a MultiError is never
// changed unless requested.
impl MultiError {
    /// The number of failures
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Swap the failures at positions `i` and `j`
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` are out of bounds.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.errors_mut().swap(i, j);
    }

    /// Return `true` if the message of the failure at position `i` sorts before the
    /// message of the failure at position `j`
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` are out of bounds.
    pub fn less(&self, i: usize, j: usize) -> bool {
        self.errors[i].to_string() < self.errors[j].to_string()
    }

    /// Sort the failures by their message
    ///
    /// ```
    /// use multierror::MultiError;
    ///
    /// let mut err = MultiError::from_iter(["c", "a", "b"]);
    /// err.sort_by_message();
    ///
    /// let messages: Vec<_> = err.iter().map(|e| e.to_string()).collect();
    /// assert_eq!(messages, ["a", "b", "c"]);
    /// ```
    pub fn sort_by_message(&mut self) {
        self.errors_mut().sort_by_cached_key(|err| err.to_string());
    }
}
