use super::types::{Column, FilterOrderInfo};

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate<C: Column>(infos: &[FilterOrderInfo<C>]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column.column(), i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
