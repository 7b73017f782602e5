//! 消息模板目录
//!
//! 只读的命名模板注册表，提供 `{{variable}}` 变量替换。
//! 渲染是纯字符串替换，没有条件和循环；目录本身不校验变量
//! 完整性，缺失的变量保留原样并记录警告，由生产方自行兜底。
//!
//! ## 使用示例
//!
//! ```ignore
//! let catalog = TemplateCatalog::with_defaults();
//! let tpl = catalog.get("new_job_match").unwrap();
//!
//! let mut vars = HashMap::new();
//! vars.insert("job_title".to_string(), "Rust 后端工程师".to_string());
//! vars.insert("company".to_string(), "JobHub".to_string());
//!
//! let (title, message) = catalog.render(tpl, &vars);
//! ```

use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::models::{NotificationChannel, NotificationType};

/// 命名消息模板
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    /// 模板名（唯一）
    pub name: &'static str,
    /// 对应的通知类型
    pub notification_type: NotificationType,
    /// 标题模式
    pub title_pattern: &'static str,
    /// 正文模式
    pub message_pattern: &'static str,
    /// 渲染所需的变量集合
    pub variables: &'static [&'static str],
    /// 允许的投递渠道
    pub channels: &'static [NotificationChannel],
}

/// 模板目录
pub struct TemplateCatalog {
    templates: Vec<MessageTemplate>,
    variable_regex: Regex,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TemplateCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            // 匹配 {{variable_name}} 格式，变量名支持字母、数字、下划线
            variable_regex: Regex::new(r"\{\{(\w+)\}\}").expect("合法的静态正则"),
        }
    }

    /// 创建带有内置模板的目录
    pub fn with_defaults() -> Self {
        use NotificationChannel::{Email, InApp, Push, Sms};

        let mut catalog = Self::new();

        catalog.register(MessageTemplate {
            name: "application_status_changed",
            notification_type: NotificationType::ApplicationStatusChanged,
            title_pattern: "投递状态更新",
            message_pattern: "您投递的「{{job_title}}」状态更新为：{{status}}",
            variables: &["job_title", "status"],
            channels: &[InApp, Push, Email],
        });

        catalog.register(MessageTemplate {
            name: "new_job_match",
            notification_type: NotificationType::NewJobMatch,
            title_pattern: "发现新的匹配职位",
            message_pattern: "「{{company}}」的「{{job_title}}」与您的求职意向高度匹配，快去看看吧！",
            variables: &["company", "job_title"],
            channels: &[InApp, Push, Email],
        });

        catalog.register(MessageTemplate {
            name: "interview_scheduled",
            notification_type: NotificationType::InterviewScheduled,
            title_pattern: "面试安排通知",
            message_pattern: "「{{company}}」邀请您于 {{interview_time}} 参加「{{job_title}}」面试",
            variables: &["company", "job_title", "interview_time"],
            channels: &[InApp, Push, Email, Sms],
        });

        catalog.register(MessageTemplate {
            name: "payment_outcome",
            notification_type: NotificationType::PaymentOutcome,
            title_pattern: "支付结果通知",
            message_pattern: "您的订单 {{order_id}} {{outcome}}",
            variables: &["order_id", "outcome"],
            channels: &[InApp, Email],
        });

        catalog.register(MessageTemplate {
            name: "security_alert",
            notification_type: NotificationType::SecurityAlert,
            title_pattern: "账号安全提醒",
            message_pattern: "检测到您的账号在 {{location}} 有{{action}}操作，若非本人请立即修改密码",
            variables: &["location", "action"],
            channels: &[InApp, Push, Email, Sms],
        });

        catalog.register(MessageTemplate {
            name: "system_update",
            notification_type: NotificationType::SystemUpdate,
            title_pattern: "{{title}}",
            message_pattern: "{{content}}",
            variables: &["title", "content"],
            channels: &[InApp],
        });

        catalog.register(MessageTemplate {
            name: "welcome",
            notification_type: NotificationType::Welcome,
            title_pattern: "欢迎加入 JobHub",
            message_pattern: "{{user_name}}，欢迎加入！完善简历可以获得更精准的职位推荐。",
            variables: &["user_name"],
            channels: &[InApp, Email],
        });

        catalog.register(MessageTemplate {
            name: "verification",
            notification_type: NotificationType::Verification,
            title_pattern: "验证您的账号",
            message_pattern: "您的验证码是 {{code}}，{{ttl_minutes}} 分钟内有效",
            variables: &["code", "ttl_minutes"],
            channels: &[Email, Sms],
        });

        catalog.register(MessageTemplate {
            name: "password_reset",
            notification_type: NotificationType::PasswordReset,
            title_pattern: "密码重置请求",
            message_pattern: "点击链接重置密码：{{reset_url}}，若非本人操作请忽略",
            variables: &["reset_url"],
            channels: &[Email],
        });

        catalog
    }

    /// 注册模板
    pub fn register(&mut self, template: MessageTemplate) {
        self.templates.push(template);
    }

    /// 按名称查找模板
    pub fn get(&self, name: &str) -> Option<&MessageTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// 全部模板（管理端目录导出）
    pub fn all(&self) -> &[MessageTemplate] {
        &self.templates
    }

    /// 渲染单个模式串
    ///
    /// 未提供的变量保留 `{{name}}` 原样并记录警告。
    pub fn render_pattern(&self, pattern: &str, variables: &HashMap<String, String>) -> String {
        self.variable_regex
            .replace_all(pattern, |caps: &regex::Captures| {
                let var_name = &caps[1];
                match variables.get(var_name) {
                    Some(value) => value.clone(),
                    None => {
                        warn!(variable = var_name, "模板变量未提供，保留原样");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    /// 渲染模板的标题和正文
    pub fn render(
        &self,
        template: &MessageTemplate,
        variables: &HashMap<String, String>,
    ) -> (String, String) {
        (
            self.render_pattern(template.title_pattern, variables),
            self.render_pattern(template.message_pattern, variables),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_variables() {
        let catalog = TemplateCatalog::with_defaults();
        let tpl = catalog.get("new_job_match").unwrap();

        let (title, message) = catalog.render(
            tpl,
            &vars(&[("company", "JobHub"), ("job_title", "Rust 后端工程师")]),
        );

        assert_eq!(title, "发现新的匹配职位");
        assert!(message.contains("JobHub"));
        assert!(message.contains("Rust 后端工程师"));
        assert!(!message.contains("{{"));
    }

    #[test]
    fn test_missing_variable_left_literal() {
        let catalog = TemplateCatalog::with_defaults();
        let rendered = catalog.render_pattern("您的验证码是 {{code}}", &HashMap::new());
        assert_eq!(rendered, "您的验证码是 {{code}}");
    }

    #[test]
    fn test_unknown_template_is_none() {
        let catalog = TemplateCatalog::with_defaults();
        assert!(catalog.get("no_such_template").is_none());
    }

    #[test]
    fn test_defaults_cover_all_types() {
        let catalog = TemplateCatalog::with_defaults();
        for t in crate::models::NotificationType::ALL {
            assert!(
                catalog
                    .all()
                    .iter()
                    .any(|tpl| tpl.notification_type == t),
                "缺少类型 {t} 的模板"
            );
        }
    }

    #[test]
    fn test_declared_channels_respected() {
        let catalog = TemplateCatalog::with_defaults();
        let tpl = catalog.get("password_reset").unwrap();
        assert_eq!(tpl.channels, &[NotificationChannel::Email]);
    }
}
