use async_trait::async_trait;
use review_wire::{AgentResponse, InvokeInput, Skill};

/// One skill implementation an agent process hosts. Registered skill ids
/// must be unique within a process.
#[async_trait]
pub trait SkillHandler: Send + Sync {
	/// The advertised capability (id, schemas, version) for this skill.
	fn skill(&self) -> Skill;

	/// Handles one `invoke` round. `Err` maps to a JSON-RPC `-32603`
	/// (error raised inside skill execution).
	async fn handle(&self, input: InvokeInput) -> Result<AgentResponse, String>;
}
