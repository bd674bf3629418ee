use sea_orm::{
    ColumnTrait,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

/// Case-insensitive substring match: `LOWER(col) LIKE '%needle%'`.
///
/// LIKE metacharacters in `needle` are escaped, so user input such as `"50%"`
/// matches literally.
pub fn contains_ignore_case<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
        .like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    mod city {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "cities")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i64,
            pub name: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    #[test]
    fn should_escape_like_metacharacters() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
        assert_eq!(escape_like("lagos"), "lagos");
    }

    #[test]
    fn should_lowercase_column_and_needle() {
        let sql = city::Entity::find()
            .filter(contains_ignore_case(city::Column::Name, "LaGos"))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#"LOWER("cities"."name") LIKE '%lagos%'"#), "{sql}");
    }
}
