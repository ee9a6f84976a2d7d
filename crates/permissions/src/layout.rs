//! Presentation order of matrix rows.
//!
//! Top-level modules are sorted by `order`, each one immediately followed by
//! its submenus (also sorted by `order`), and the sequence is then grouped by
//! category in order of first appearance. Submenus stay in their parent's
//! group. Submenus whose parent is not a top-level module of the list go to
//! the end of their own category. Sorting is stable, so equal `order` values
//! keep the server's order.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use inmoadmin_core::ModuleId;

use crate::model::Module;

/// Rows of one category, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup<T> {
    pub category: String,
    pub items: Vec<T>,
}

impl AsRef<Module> for Module {
    fn as_ref(&self) -> &Module {
        self
    }
}

/// Arrange items into display order. No item is dropped.
pub fn arrange<T: AsRef<Module>>(items: Vec<T>) -> Vec<CategoryGroup<T>> {
    let top_level: HashSet<ModuleId> = items
        .iter()
        .map(AsRef::as_ref)
        .filter(|m| !m.is_submenu)
        .map(|m| m.id)
        .collect();

    let mut parents: Vec<T> = Vec::new();
    let mut children: HashMap<ModuleId, Vec<T>> = HashMap::new();
    let mut orphans: Vec<T> = Vec::new();

    for item in items {
        let (is_submenu, parent_id) = {
            let module = item.as_ref();
            (module.is_submenu, module.parent_id)
        };
        if !is_submenu {
            parents.push(item);
            continue;
        }
        match parent_id {
            Some(parent_id) if top_level.contains(&parent_id) => {
                children.entry(parent_id).or_default().push(item);
            }
            _ => orphans.push(item),
        }
    }

    parents.sort_by_key(|p| p.as_ref().order);
    orphans.sort_by_key(|o| o.as_ref().order);

    let mut groups: Vec<CategoryGroup<T>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for parent in parents {
        let category = parent.as_ref().category.clone();
        let mut subs = children.remove(&parent.as_ref().id).unwrap_or_default();
        subs.sort_by_key(|c| c.as_ref().order);

        let group = group_for(&mut groups, &mut index, category);
        group.items.push(parent);
        group.items.extend(subs);
    }

    for orphan in orphans {
        let category = orphan.as_ref().category.clone();
        group_for(&mut groups, &mut index, category).items.push(orphan);
    }

    groups
}

fn group_for<'a, T>(
    groups: &'a mut Vec<CategoryGroup<T>>,
    index: &mut HashMap<String, usize>,
    category: String,
) -> &'a mut CategoryGroup<T> {
    let idx = *index.entry(category.clone()).or_insert_with(|| {
        groups.push(CategoryGroup {
            category,
            items: Vec::new(),
        });
        groups.len() - 1
    });
    &mut groups[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<T: AsRef<Module>>(groups: &[CategoryGroup<T>]) -> Vec<(String, Vec<String>)> {
        groups
            .iter()
            .map(|g| {
                (
                    g.category.clone(),
                    g.items.iter().map(|i| i.as_ref().name.clone()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn parents_sorted_and_followed_by_their_children() {
        let contactos = Module::top_level("Contactos", "crm", 2);
        let propiedades = Module::top_level("Propiedades", "crm", 1);
        let pagos = Module::top_level("Pagos", "finanzas", 0);
        let importar = Module::submenu(&propiedades, "Importar", 2);
        let fichas = Module::submenu(&propiedades, "Fichas", 1);

        let groups = arrange(vec![
            importar,
            contactos,
            pagos,
            fichas,
            propiedades,
        ]);

        assert_eq!(
            names(&groups),
            vec![
                ("finanzas".to_string(), vec!["Pagos".to_string()]),
                (
                    "crm".to_string(),
                    vec![
                        "Propiedades".to_string(),
                        "Fichas".to_string(),
                        "Importar".to_string(),
                        "Contactos".to_string(),
                    ]
                ),
            ]
        );
    }

    #[test]
    fn child_stays_with_parent_even_across_categories() {
        let crm = Module::top_level("Equipos", "crm", 1);
        let mut oficinas = Module::submenu(&crm, "Oficinas", 1);
        oficinas.category = "admin".to_string();

        let groups = arrange(vec![oficinas, crm]);
        assert_eq!(
            names(&groups),
            vec![(
                "crm".to_string(),
                vec!["Equipos".to_string(), "Oficinas".to_string()]
            )]
        );
    }

    #[test]
    fn orphaned_submenus_are_kept_at_the_end_of_their_category() {
        let flyers = Module::top_level("Flyers", "marketing", 1);
        let ghost_parent = Module::top_level("Ghost", "marketing", 0);
        let orphan = Module::submenu(&ghost_parent, "Plantillas", 0);

        let groups = arrange(vec![orphan, flyers]);
        assert_eq!(
            names(&groups),
            vec![(
                "marketing".to_string(),
                vec!["Flyers".to_string(), "Plantillas".to_string()]
            )]
        );
    }

    #[test]
    fn equal_order_keeps_input_order() {
        let a = Module::top_level("A", "crm", 1);
        let b = Module::top_level("B", "crm", 1);
        let groups = arrange(vec![b, a]);
        assert_eq!(groups[0].items[0].name, "B");
        assert_eq!(groups[0].items[1].name, "A");
    }
}
