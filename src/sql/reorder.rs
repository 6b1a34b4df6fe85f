/// Move partition columns to the end of a column list.
///
/// Non-partition columns keep their order from `all_columns`; partition
/// columns follow in the order given by `partition_columns`. Partition names
/// that do not exist in `all_columns` are dropped. Duplicates in either list
/// are kept as they appear.
pub fn reorder_columns_with_partitions(
    all_columns: &[String],
    partition_columns: &[String],
) -> Vec<String> {
    let mut reordered: Vec<String> = all_columns
        .iter()
        .filter(|col| !partition_columns.contains(col))
        .cloned()
        .collect();

    reordered.extend(
        partition_columns
            .iter()
            .filter(|col| all_columns.contains(col))
            .cloned(),
    );

    reordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partition_column_moves_last() {
        assert_eq!(
            reorder_columns_with_partitions(&cols(&["a", "b", "c"]), &cols(&["b"])),
            cols(&["a", "c", "b"])
        );
    }

    #[test]
    fn test_unknown_partition_column_dropped() {
        assert_eq!(
            reorder_columns_with_partitions(&cols(&["a", "b"]), &cols(&["z"])),
            cols(&["a", "b"])
        );
    }

    #[test]
    fn test_partition_order_follows_partition_list() {
        assert_eq!(
            reorder_columns_with_partitions(
                &cols(&["id", "day", "amount", "region"]),
                &cols(&["region", "day"])
            ),
            cols(&["id", "amount", "region", "day"])
        );
    }

    #[test]
    fn test_duplicates_preserved() {
        assert_eq!(
            reorder_columns_with_partitions(&cols(&["a", "b", "a"]), &cols(&["b", "b"])),
            cols(&["a", "a", "b", "b"])
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(reorder_columns_with_partitions(&[], &cols(&["a"])).is_empty());
        assert_eq!(
            reorder_columns_with_partitions(&cols(&["a", "b"]), &[]),
            cols(&["a", "b"])
        );
    }
}
