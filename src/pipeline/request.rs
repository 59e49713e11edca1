use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::model::{GenerateRequest, ImagePayload, Part};
use crate::prompts::{GEOMETRY_ANALYSIS_PROMPT, IMAGE_ONLY_PROBLEM, REFINEMENT_DIRECTIVE};

/// Sampling temperature for analysis calls.
const ANALYSIS_TEMPERATURE: f32 = 0.2;

/// One analysis submission: problem text and/or photo, plus optional refinement feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// The problem statement as typed by the student
    pub problem_text: String,
    /// Photo of the problem, if any
    #[serde(skip)]
    pub image: Option<ImagePayload>,
    /// Free-text feedback on the previous answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl AnalysisRequest {
    /// Create a request with just problem text
    pub fn new(problem_text: impl Into<String>) -> Self {
        Self {
            problem_text: problem_text.into(),
            image: None,
            feedback: None,
        }
    }

    /// Attach a photo of the problem
    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }

    /// Ask for a revision of the previous answer
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    /// Feedback text, if present and non-blank
    pub fn refinement(&self) -> Option<&str> {
        self.feedback
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }

    /// Reject requests carrying neither text nor image
    pub fn validate(&self) -> PipelineResult<()> {
        if self.problem_text.trim().is_empty() && self.image.is_none() {
            return Err(PipelineError::InvalidInput {
                message: "Enter the problem text or attach a photo of it".to_string(),
            });
        }
        Ok(())
    }
}

/// Build the natural-language instruction for a request
pub fn build_instruction(request: &AnalysisRequest) -> String {
    let problem = request.problem_text.trim();
    let problem = if problem.is_empty() {
        IMAGE_ONLY_PROBLEM
    } else {
        problem
    };

    let mut instruction = format!("{}\n\nProblem:\n{}", GEOMETRY_ANALYSIS_PROMPT, problem);

    if let Some(feedback) = request.refinement() {
        instruction.push_str("\n\n");
        instruction.push_str(&REFINEMENT_DIRECTIVE.replace("{feedback}", feedback));
    }

    instruction
}

/// Build the wire request: instruction text first, then the optional image
pub fn build_generate_request(request: &AnalysisRequest) -> GenerateRequest {
    let mut parts = vec![Part::text(build_instruction(request))];
    if let Some(image) = &request.image {
        parts.push(Part::image(image));
    }
    GenerateRequest::new(parts)
        .with_json_output()
        .with_temperature(ANALYSIS_TEMPERATURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_request() {
        let result = AnalysisRequest::new("   ").validate();
        assert!(matches!(result, Err(PipelineError::InvalidInput { .. })));
    }

    #[test]
    fn test_validate_accepts_image_only() {
        let request = AnalysisRequest::new("")
            .with_image(ImagePayload::from_bytes(b"img", "image/png"));
        assert!(request.validate().is_ok());
        assert!(build_instruction(&request).contains(IMAGE_ONLY_PROBLEM));
    }

    #[test]
    fn test_instruction_embeds_problem_and_rules() {
        let instruction = build_instruction(&AnalysisRequest::new("Prove AM ⊥ BC"));
        assert!(instruction.starts_with(GEOMETRY_ANALYSIS_PROMPT));
        assert!(instruction.ends_with("Problem:\nProve AM ⊥ BC"));
        assert!(!instruction.contains("asked for changes"));
    }

    #[test]
    fn test_instruction_quotes_feedback() {
        let request = AnalysisRequest::new("Prove AM ⊥ BC").with_feedback("Use the median theorem");
        let instruction = build_instruction(&request);
        assert!(instruction.contains("\"\"\"\nUse the median theorem\n\"\"\""));
        assert!(instruction.contains("feedback takes priority"));
    }

    #[test]
    fn test_blank_feedback_is_ignored() {
        let request = AnalysisRequest::new("x").with_feedback("  ");
        assert!(request.refinement().is_none());
    }

    #[test]
    fn test_generate_request_parts() {
        let request = AnalysisRequest::new("problem")
            .with_image(ImagePayload::from_bytes(b"img", "image/jpeg"));
        let payload = build_generate_request(&request);
        let parts: Vec<&Part> = payload.parts().collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].as_text().unwrap().contains("problem"));
        assert!(matches!(parts[1], Part::InlineData { .. }));
        assert_eq!(
            payload
                .generation_config
                .as_ref()
                .and_then(|c| c.response_mime_type.as_deref()),
            Some("application/json")
        );
    }
}
