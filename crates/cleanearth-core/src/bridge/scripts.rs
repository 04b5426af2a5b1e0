//! Scripts and documents the shell injects into the hosted content.

use crate::config::ShellConfig;

pub const RESULT_HANDLER: &str = "handleAIAnalysisResult";
pub const NOTIFICATION_HOOK: &str = "showNotification";
pub const READY_MESSAGE: &str = "🤖 AI Garbage Detection Ready!";
pub const GO_BACK_SCRIPT: &str = "if (window.history.length > 1) { window.history.back(); }";

const BOOTSTRAP_TEMPLATE: &str = r#"(function () {
  var invoke = function (command, args) {
    if (!window.__TAURI__ || !window.__TAURI__.core) {
      return Promise.reject(new Error('CleanEarth bridge unavailable'));
    }
    return window.__TAURI__.core.invoke(command, args);
  };

  window.CleanEarthAI = {
    analyzeCleanupImage: function (imageData) {
      return invoke('request_analysis', { imageData: String(imageData) });
    },
    getAIModelStatus: function () {
      return invoke('get_model_status');
    },
    simulateGarbageDetection: function () {
      return invoke('get_simulated_detection');
    },
    chooseImage: function (acceptTypes) {
      return invoke('select_file', { params: { acceptTypes: acceptTypes || ['image/*'] } });
    },
    goBack: function () {
      return invoke('go_back');
    }
  };

  window.analyzeWithAI = function (imageData) {
    return window.CleanEarthAI.analyzeCleanupImage(imageData);
  };
  window.getAIStatus = function () {
    return window.CleanEarthAI.getAIModelStatus();
  };
  window.testAI = function () {
    return window.CleanEarthAI.simulateGarbageDetection();
  };

  console.log('CleanEarth bridge installed');

  setTimeout(function () {
    window.getAIStatus().then(function (status) {
      if (status === 'READY' && typeof window.__NOTIFY__ === 'function') {
        window.__NOTIFY__(__READY_MESSAGE__, 'success');
      }
    }).catch(function (err) {
      console.warn('CleanEarth status probe failed', err);
    });
  }, __STATUS_PROBE_MS__);
})();"#;

const RETRY_PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"></head>
  <body style="text-align:center; padding:50px; font-family:Arial, sans-serif;">
    <h2>⚠️ Connection Error</h2>
    <p>Unable to load CleanEarth website.</p>
    <button id="retry" onclick="retry(this)"
            style="padding:10px 20px; background:#2E8B57; color:white; border:none; border-radius:5px;">
      Retry
    </button>
    <script>
      var TARGET = __TARGET__;
      function retry(button) {
        if (button.disabled) { return; }
        button.disabled = true;
        if (window.__TAURI__ && window.__TAURI__.core) {
          window.__TAURI__.core.invoke('retry_navigation').catch(function () {
            window.location.replace(TARGET);
          });
        } else {
          window.location.replace(TARGET);
        }
      }
    </script>
  </body>
</html>"#;

/// Installs the bridge globals into the content and schedules the readiness probe.
pub fn bootstrap_script(config: &ShellConfig) -> String {
    BOOTSTRAP_TEMPLATE
        .replace("__NOTIFY__", NOTIFICATION_HOOK)
        .replace("__READY_MESSAGE__", &js_string(READY_MESSAGE))
        .replace("__STATUS_PROBE_MS__", &config.status_probe_ms.to_string())
}

pub fn delivery_script(result_json: &str) -> String {
    format!(
        "if (typeof window.{handler} === 'function') {{ window.{handler}({json}); }}",
        handler = RESULT_HANDLER,
        json = result_json
    )
}

/// Static page whose single retry action re-issues the navigation to `base_url`.
pub fn retry_page(base_url: &str) -> String {
    RETRY_PAGE_TEMPLATE.replace("__TARGET__", &js_string(base_url))
}

pub fn replace_document_script(html: &str) -> String {
    format!(
        "document.open(); document.write({}); document.close();",
        js_string(html)
    )
}

// JSON string literal that is also safe inside an inline <script> block.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}
