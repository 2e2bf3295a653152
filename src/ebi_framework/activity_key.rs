use std::{collections::HashMap, fmt::{Debug, Display}, hash::Hash};

/// Handle of an interned activity label. Only meaningful together with the [ActivityKey] that issued it.
#[derive(Clone, Copy)]
pub struct Activity {
    id: usize
}

impl PartialEq for Activity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl PartialEq<usize> for Activity {
    fn eq(&self, other: &usize) -> bool {
        &self.id == other
    }
}

impl Eq for Activity {}

impl Hash for Activity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ac{}", self.id)
    }
}

impl Debug for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ac{}", self.id)
    }
}

impl PartialOrd for Activity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Activity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ActivityKey {
    name2activity: HashMap<String, Activity>,
    activity2name: Vec<String>,
}

impl ActivityKey {
    pub fn new() -> Self {
        Self {
            name2activity: HashMap::new(),
            activity2name: vec![],
        }
    }

    pub fn get_number_of_activities(&self) -> usize {
        self.activity2name.len()
    }

    pub fn process_activity(&mut self, activity: &str) -> Activity {
        match self.name2activity.get(activity) {
            Some(index) => *index,
            None => {
                let result = Activity { id: self.activity2name.len() };
                self.activity2name.push(activity.to_string());
                self.name2activity.insert(activity.to_string(), result);
                result
            },
        }
    }

    pub fn process_trace(&mut self, trace: &[impl AsRef<str>]) -> Vec<Activity> {
        trace.iter().map(|activity| self.process_activity(activity.as_ref())).collect()
    }

    /**
     * Looks up a label without extending the key.
     */
    pub fn get_activity(&self, label: &str) -> Option<Activity> {
        self.name2activity.get(label).copied()
    }

    pub fn get_activity_label(&self, activity: &Activity) -> &str {
        &self.activity2name[activity.id]
    }

    pub fn deprocess_trace(&self, trace: &[Activity]) -> Vec<&str> {
        trace.iter().map(|activity| self.get_activity_label(activity)).collect()
    }
}

impl Display for ActivityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, label) in self.activity2name.iter().enumerate() {
            write!(f, "ac{}: {}, ", i, label)?;
        }
        write!(f, "")
    }
}

#[cfg(test)]
mod tests {
    use super::ActivityKey;

    #[test]
    fn activity_key_interning() {
        let mut activity_key = ActivityKey::new();
        let trace = activity_key.process_trace(&["a", "b", "a"]);

        assert_eq!(trace[0], trace[2]);
        assert_ne!(trace[0], trace[1]);
        assert_eq!(activity_key.get_number_of_activities(), 2);
        assert_eq!(activity_key.deprocess_trace(&trace), vec!["a", "b", "a"]);
        assert_eq!(activity_key.get_activity("b"), Some(trace[1]));
        assert_eq!(activity_key.get_activity("c"), None);
    }

    #[test]
    fn activity_key_extension_keeps_handles() {
        let mut model_key = ActivityKey::new();
        let a = model_key.process_activity("a");

        let mut extended = model_key.clone();
        let x = extended.process_activity("x");

        assert_eq!(extended.get_activity("a"), Some(a));
        assert_ne!(a, x);
        assert_eq!(model_key.get_activity("x"), None);
    }
}
