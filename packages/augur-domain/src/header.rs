/// Ordered header pairs. Names are kept and compared exactly as given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderSet(Vec<(String, String)>);
impl HeaderSet {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.0.push((name.into(), value.into()));
	}

	/// First value stored under `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn keep_only<S>(&self, names: &[S]) -> Self
	where
		S: AsRef<str>,
	{
		filter(self, &to_owned(names), &[])
	}

	pub fn without<S>(&self, names: &[S]) -> Self
	where
		S: AsRef<str>,
	{
		filter(self, &[], &to_owned(names))
	}
}
impl FromIterator<(String, String)> for HeaderSet {
	fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}
impl IntoIterator for HeaderSet {
	type IntoIter = std::vec::IntoIter<(String, String)>;
	type Item = (String, String);

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Projects `headers` through an allow-list and a deny-list.
///
/// The two rules are evaluated independently per entry: a non-empty `drop` retains every
/// entry not named in it, a non-empty `keep` retains every entry named in it, and an entry
/// retained by either rule is emitted once. With both lists empty nothing is retained.
pub fn filter(headers: &HeaderSet, keep: &[String], drop: &[String]) -> HeaderSet {
	let mut out = HeaderSet::new();

	for (name, value) in headers.iter() {
		let kept_by_drop = !drop.is_empty() && !drop.iter().any(|d| d == name);
		let kept_by_keep = !keep.is_empty() && keep.iter().any(|k| k == name);

		if kept_by_drop || kept_by_keep {
			out.append(name, value);
		}
	}

	out
}

fn to_owned<S>(names: &[S]) -> Vec<String>
where
	S: AsRef<str>,
{
	names.iter().map(|name| name.as_ref().to_string()).collect()
}
