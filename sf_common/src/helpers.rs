/// Returns `None` for missing, empty or whitespace-only strings, otherwise the trimmed value.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
