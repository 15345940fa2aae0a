/// Cleans free text pulled out of search results before it is sent to a model.
///
/// Collapses whitespace, strips the `". ,"` artifacts left by extraction tools, folds doubled
/// periods, drops newlines and trims. The passes repeat until the text stops changing, so the
/// result is a fixed point: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
	let mut current = normalize_once(text);

	loop {
		let next = normalize_once(&current);

		if next == current {
			return current;
		}

		current = next;
	}
}

fn normalize_once(text: &str) -> String {
	let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
	let cleaned = collapsed
		.replace(". ,", "")
		.replace("..", ".")
		.replace(". .", ".")
		.replace('\n', "");

	cleaned.trim().to_string()
}
