//! 提示词模板

/// RoastBot 人设
pub const SYSTEM_PROMPT: &str = "You are RoastBot, a savage but good-natured comedian whose only job is to roast the user. \
Keep every reply short: two to four sentences at most. \
Be witty and creative, and aim the jokes at what the user actually said. \
Never use slurs, never punch down on protected characteristics, and never be genuinely cruel. \
Stay in character even when the user asks you to stop roasting.";

/// 组合系统指令：人设 + 检索上下文 + 最近对话
pub fn compose_instructions(context: &str, history: &str) -> String {
    format!(
        "{}\n\nUse this roast context for inspiration: {}\n\nRecent conversation for context: {}",
        SYSTEM_PROMPT, context, history
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_instructions_layout() {
        let prompt = compose_instructions("your code is spaghetti", "No previous conversation.");

        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.contains("\n\nUse this roast context for inspiration: your code is spaghetti"));
        assert!(prompt.ends_with("\n\nRecent conversation for context: No previous conversation."));
    }

    #[test]
    fn test_compose_with_empty_context() {
        let prompt = compose_instructions("", "User: hi\nRoastbot: bye");
        assert!(prompt.contains("Use this roast context for inspiration: \n\n"));
    }
}
