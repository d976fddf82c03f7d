use crate::api::Mode;
use crate::commands::{open, Out};
use crate::model::{Settings, Tag};
use crate::store::AppContext;
use crate::{Config, Result};

fn describe(settings: &Settings) -> String {
    let tags: Vec<String> = settings.enabled_tags().iter().map(Tag::to_string).collect();
    if tags.is_empty() {
        return "No tags are enabled".to_string();
    }
    format!("Enabled tags: {}", tags.join(", "))
}

async fn save(context: &AppContext, settings: Settings) -> Result<Out<Settings>> {
    context.set_settings(settings.clone()).await?;
    Ok(Out::new(describe(&settings), settings))
}

pub async fn settings_get(config: Config, mode: Mode) -> Result<Out<Settings>> {
    let context = open(&config, mode).await?;
    let settings = context.current_settings();
    Ok(Out::new(describe(&settings), settings))
}

/// Replaces the enabled tags with exactly `tags`.
pub async fn settings_set(config: Config, mode: Mode, tags: &[String]) -> Result<Out<Settings>> {
    let context = open(&config, mode).await?;
    let settings = context
        .current_settings()
        .replace(tags.iter().map(|t| Tag::from(t.as_str())));
    save(&context, settings).await
}

pub async fn settings_reset(config: Config, mode: Mode) -> Result<Out<Settings>> {
    let context = open(&config, mode).await?;
    save(&context, Settings::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ViewArgs;
    use crate::commands::totals;
    use crate::model::{ExpenseTag, NonExpenseTag};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_set_is_saved_and_replaces_the_whole_set() {
        let env = TestEnv::new().await;
        let out = settings_get(env.config(), Mode::Local).await.unwrap();
        assert_eq!(out.structure(), Some(&Settings::default()));

        settings_set(
            env.config(),
            Mode::Local,
            &["Food".to_string(), "Rent".to_string()],
        )
        .await
        .unwrap();
        let out = settings_get(env.config(), Mode::Local).await.unwrap();
        assert_eq!(out.message(), "Enabled tags: Food, Rent");
        let saved = out.structure().unwrap();
        assert!(saved.is_expense_enabled(ExpenseTag::Rent));
        assert!(!saved.is_expense_enabled(ExpenseTag::Gas));
        assert!(!saved.is_enabled(&NonExpenseTag::Rsu.into()));

        let out = settings_reset(env.config(), Mode::Local).await.unwrap();
        assert_eq!(out.structure(), Some(&Settings::default()));
        let out = settings_get(env.config(), Mode::Local).await.unwrap();
        assert_eq!(out.structure(), Some(&Settings::default()));
    }

    #[tokio::test]
    async fn test_saved_settings_filter_later_views() {
        let env = TestEnv::new().await;
        add_record(&env, 30.0, "Food", "Lunch").await;
        add_record(&env, 900.0, "Rent", "April rent").await;
        let all = totals(env.config(), Mode::Local, ViewArgs::new(true, false))
            .await
            .unwrap();
        assert_eq!(all.structure().unwrap().expenses, 930.0);

        settings_set(env.config(), Mode::Local, &["Food".to_string()])
            .await
            .unwrap();
        let narrowed = totals(env.config(), Mode::Local, ViewArgs::new(true, false))
            .await
            .unwrap();
        assert_eq!(narrowed.structure().unwrap().expenses, 30.0);
    }

    async fn add_record(env: &TestEnv, amount: f64, tag: &str, description: &str) {
        let args = crate::args::AddArgs::new(
            amount,
            "2025-04-01",
            description,
            vec![tag.to_string()],
        );
        crate::commands::add(env.config(), Mode::Local, args)
            .await
            .unwrap();
    }
}
